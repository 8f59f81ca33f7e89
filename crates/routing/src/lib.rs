//! Decide which agent owns a conversation and which session key it lives
//! under.
//!
//! Everything here is a pure function of the loaded config and the input
//! key or target; nothing reads global state except the default workspace
//! root, which falls back to the process data directory.

pub mod agent_scope;
pub mod error;
pub mod outbound;

pub use {
    agent_scope::{
        list_agent_ids, resolve_agent_config, resolve_agent_workspace_dir,
        resolve_default_agent_id, resolve_session_agent_id,
    },
    error::{Error, Result},
    outbound::{OutboundSessionRoute, resolve_outbound_session_route},
};
