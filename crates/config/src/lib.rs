//! Configuration schema, loading, env substitution, and validation.
//!
//! Config files: `switchboard.toml`, `switchboard.yaml`, or `switchboard.json`
//! Searched in `./` then the user config directory.
//!
//! The routing and history resolvers only ever read a [`SwitchboardConfig`];
//! nothing in this workspace mutates one after it is loaded.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        config_dir, data_dir, discover_and_load, load_config, parse_config, set_data_dir,
    },
    schema::{
        AgentConfig, AgentDefaults, AgentsConfig, ChannelConfig, ChannelsConfig, CommandsConfig,
        DmConfig, InboundConfig, MessagesConfig, SessionConfig, SwitchboardConfig,
    },
    validate::{Diagnostic, Severity, validate},
};
