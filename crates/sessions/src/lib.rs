//! Session identity and history windows.
//!
//! Every conversation the gateway tracks is named by a canonical session key:
//!
//! ```text
//! agent:<agentId>:main
//! agent:<agentId>:subagent:<name>
//! agent:<agentId>:<channel>:<chatType>:<peerId>[:thread:<threadId>]
//! ```
//!
//! Keys are the primary key of externally stored conversation state, so the
//! codec and the legacy migration here are pure string functions and never
//! touch storage.

pub mod error;
pub mod history;
pub mod key;
pub mod message;
pub mod migration;

pub use {
    error::{Error, Result},
    history::{get_history_limit_from_session_key, limit_history_turns},
    key::{
        PeerScope, SessionKey, SessionScope, build_peer_session_key, build_session_key,
        normalize_agent_id, parse_session_key,
    },
    message::{HistoryEntry, HistoryMessage},
    migration::{canonicalize_session_key_for_agent, is_legacy_group_key},
};
