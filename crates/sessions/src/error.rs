use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid session key \"{key}\": {reason}")]
    InvalidKey { key: String, reason: &'static str },
}

impl Error {
    #[must_use]
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
