/// Crate-wide result type for target parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// Target validation failures.
///
/// Messages are shown to whoever typed the address, so they name the
/// accepted syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A sigil (`@`, `#`) or explicit prefix was used with an invalid id, or
    /// the parsed target has the wrong kind.
    #[error("{message}")]
    InvalidTarget { message: String },
}

impl Error {
    #[must_use]
    pub fn invalid_target(message: impl std::fmt::Display) -> Self {
        Self::InvalidTarget {
            message: message.to_string(),
        }
    }
}
