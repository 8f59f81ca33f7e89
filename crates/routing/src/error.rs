#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no agents are configured (add at least one entry to agents.list)")]
    NoAgentsConfigured,
}

pub type Result<T> = std::result::Result<T, Error>;
