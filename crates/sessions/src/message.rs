//! Minimal view of stored conversation messages.
//!
//! History storage lives outside this crate; the trimmer only needs to know
//! which messages open a turn.

use serde::{Deserialize, Serialize};

/// A message that can take part in turn-based history trimming.
pub trait HistoryMessage {
    /// `true` for user-authored messages, which open a new turn.
    fn is_user_turn(&self) -> bool;
}

/// A message as written to a session transcript, tagged by `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum HistoryEntry {
    System {
        content: String,
    },
    User {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::User { content, .. }
            | Self::Assistant { content, .. }
            | Self::Tool { content, .. } => content,
        }
    }
}

impl HistoryMessage for HistoryEntry {
    fn is_user_turn(&self) -> bool {
        matches!(self, Self::User { .. })
    }
}

/// Raw transcript lines: any object whose `role` is `"user"`.
impl HistoryMessage for serde_json::Value {
    fn is_user_turn(&self) -> bool {
        self.get("role").and_then(serde_json::Value::as_str) == Some("user")
    }
}

impl<M: HistoryMessage + ?Sized> HistoryMessage for &M {
    fn is_user_turn(&self) -> bool {
        (**self).is_user_turn()
    }
}
