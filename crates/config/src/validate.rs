//! Semantic checks on a parsed configuration.
//!
//! Nothing here rejects a config: the resolvers fall back gracefully on every
//! condition reported below. Diagnostics exist so operators notice them.

use std::collections::HashSet;

use crate::schema::SwitchboardConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "agents.list[1].id"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }

    fn info(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Check agent and channel settings for conditions the resolvers would
/// silently paper over.
pub fn validate(config: &SwitchboardConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_agents(config, &mut diagnostics);
    check_channels(config, &mut diagnostics);
    diagnostics
}

fn check_agents(config: &SwitchboardConfig, out: &mut Vec<Diagnostic>) {
    let agents = &config.agents.list;
    if agents.is_empty() {
        out.push(Diagnostic::info(
            "agents.list",
            "no agents configured; session keys cannot be resolved to an agent",
        ));
        return;
    }

    let mut seen = HashSet::new();
    for (i, agent) in agents.iter().enumerate() {
        let path = format!("agents.list[{i}].id");
        let id = agent.id.trim();
        if id.is_empty() {
            out.push(Diagnostic::warning(path, "agent id is empty"));
            continue;
        }
        if id.contains(':') {
            out.push(Diagnostic::warning(
                path.clone(),
                format!("agent id \"{id}\" contains ':' and cannot appear in a session key"),
            ));
        }
        if !seen.insert(id.to_ascii_lowercase()) {
            out.push(Diagnostic::warning(
                path,
                format!("duplicate agent id \"{id}\"; only the first entry is used"),
            ));
        }
    }

    let defaults: Vec<&str> = agents
        .iter()
        .filter(|a| a.default)
        .map(|a| a.id.as_str())
        .collect();
    if defaults.len() > 1 {
        out.push(Diagnostic::warning(
            "agents.list",
            format!(
                "{} agents are marked default ({}); the first one wins",
                defaults.len(),
                defaults.join(", ")
            ),
        ));
    }
}

fn check_channels(config: &SwitchboardConfig, out: &mut Vec<Diagnostic>) {
    for (platform, channel) in &config.channels.platforms {
        if channel.history_limit == Some(0) {
            out.push(zero_limit(format!("channels.{platform}.history_limit")));
        }
        if channel.dm_history_limit == Some(0) {
            out.push(zero_limit(format!("channels.{platform}.dm_history_limit")));
        }
        for (peer, dm) in &channel.dms {
            if dm.history_limit == Some(0) {
                out.push(zero_limit(format!(
                    "channels.{platform}.dms.{peer}.history_limit"
                )));
            }
        }
    }
}

fn zero_limit(path: String) -> Diagnostic {
    Diagnostic::info(path, "a history limit of 0 keeps the full history")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AgentConfig, ChannelConfig};

    fn config_with(agents: Vec<AgentConfig>) -> SwitchboardConfig {
        let mut cfg = SwitchboardConfig::default();
        cfg.agents.list = agents;
        cfg
    }

    #[test]
    fn clean_config_has_no_diagnostics() {
        let cfg = config_with(vec![AgentConfig::new("main"), AgentConfig::new("ops")]);
        assert!(validate(&cfg).is_empty());
    }

    #[test]
    fn flags_duplicate_and_colon_ids() {
        let cfg = config_with(vec![
            AgentConfig::new("main"),
            AgentConfig::new("Main"),
            AgentConfig::new("a:b"),
        ]);
        let diags = validate(&cfg);
        assert_eq!(diags.len(), 2);
        assert!(diags[0].message.contains("duplicate"));
        assert_eq!(diags[0].path, "agents.list[1].id");
        assert!(diags[1].message.contains("contains ':'"));
    }

    #[test]
    fn flags_multiple_defaults() {
        let mut a = AgentConfig::new("a");
        a.default = true;
        let mut b = AgentConfig::new("b");
        b.default = true;
        let diags = validate(&config_with(vec![a, b]));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert!(diags[0].message.contains("a, b"));
    }

    #[test]
    fn notes_zero_history_limits() {
        let mut cfg = config_with(vec![AgentConfig::new("main")]);
        cfg.channels.insert("slack", ChannelConfig {
            dm_history_limit: Some(0),
            ..Default::default()
        });
        let diags = validate(&cfg);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "channels.slack.dm_history_limit");
        assert_eq!(diags[0].severity, Severity::Info);
    }

    #[test]
    fn empty_agent_list_is_informational() {
        let diags = validate(&SwitchboardConfig::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Info);
    }
}
