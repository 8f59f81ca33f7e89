//! Shared vocabulary used across all switchboard crates: chat types,
//! channel identifiers, and the parse error for both.

pub mod types;

pub use types::{ChannelType, ChatType, UnknownVariant};
