//! Config schema types (agents, channels, session, inbound messages).
//!
//! Field names are snake_case; camelCase aliases let configs exported by
//! older gateways load without edits.

use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    pub agents: AgentsConfig,
    pub channels: ChannelsConfig,
    pub session: SessionConfig,
    pub messages: MessagesConfig,
}

/// Configured agents, in the order they were declared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub list: Vec<AgentConfig>,
    pub defaults: AgentDefaults,
}

/// A single agent entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// At most one agent should set this; when none does, the first listed
    /// agent is the default.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
    /// Workspace path. A leading `~` expands to the home directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

impl AgentConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Settings shared by every agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDefaults {
    /// Root for agents without an explicit workspace. Defaults to
    /// `<data_dir>/workspaces`.
    #[serde(alias = "workspaceRoot", skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,
}

/// Per-platform channel settings, keyed by platform name (`telegram`, `slack`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelsConfig {
    pub platforms: BTreeMap<String, ChannelConfig>,
}

impl ChannelsConfig {
    /// Look up a platform case-insensitively.
    pub fn get(&self, platform: &str) -> Option<&ChannelConfig> {
        self.platforms.get(platform).or_else(|| {
            self.platforms
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(platform))
                .map(|(_, cfg)| cfg)
        })
    }

    pub fn insert(&mut self, platform: impl Into<String>, config: ChannelConfig) {
        self.platforms.insert(platform.into(), config);
    }
}

/// History and batching settings for one platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Turns kept for any conversation on this platform.
    #[serde(alias = "historyLimit", skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<u32>,
    /// Turns kept for direct conversations; falls back to `history_limit`.
    #[serde(alias = "dmHistoryLimit", skip_serializing_if = "Option::is_none")]
    pub dm_history_limit: Option<u32>,
    /// Per-peer overrides for direct conversations.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub dms: HashMap<String, DmConfig>,
    /// Inbound debounce window for this platform in milliseconds.
    #[serde(alias = "debounceMs", skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

/// Override for a single direct-message peer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DmConfig {
    #[serde(alias = "historyLimit", skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<u32>,
}

/// Session identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bare key that legacy deployments used for the primary conversation.
    #[serde(alias = "mainKey")]
    pub main_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            main_key: "main".into(),
        }
    }
}

/// Inbound message handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub inbound: InboundConfig,
    pub commands: CommandsConfig,
}

/// Debounce windows for coalescing bursts of inbound messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundConfig {
    /// Global window in milliseconds. 0 disables batching.
    #[serde(alias = "debounceMs")]
    pub debounce_ms: u64,
    /// Per-platform windows, taking precedence over everything else.
    #[serde(alias = "byChannel", skip_serializing_if = "HashMap::is_empty")]
    pub by_channel: HashMap<String, u64>,
}

/// Slash commands that bypass batching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Names recognised in addition to the built-in set, without the `/`.
    pub extra: Vec<String>,
}
