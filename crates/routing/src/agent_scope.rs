use std::path::{Path, PathBuf};

use {
    switchboard_config::{AgentConfig, SwitchboardConfig},
    switchboard_sessions::{canonicalize_session_key_for_agent, normalize_agent_id, parse_session_key},
    tracing::debug,
};

use crate::{Error, Result};

const WORKSPACES_DIR: &str = "workspaces";

/// Configured agent ids in declaration order.
pub fn list_agent_ids(config: &SwitchboardConfig) -> Vec<&str> {
    config.agents.list.iter().map(|a| a.id.as_str()).collect()
}

/// The agent flagged `default`, else the first listed agent.
pub fn resolve_default_agent_id(config: &SwitchboardConfig) -> Result<&str> {
    let agents = &config.agents.list;
    agents
        .iter()
        .find(|a| a.default)
        .or_else(|| agents.first())
        .map(|a| a.id.as_str())
        .ok_or(Error::NoAgentsConfigured)
}

/// Look up an agent by id, ignoring case and surrounding whitespace.
pub fn resolve_agent_config<'a>(
    config: &'a SwitchboardConfig,
    agent_id: &str,
) -> Option<&'a AgentConfig> {
    let wanted = normalize_agent_id(agent_id);
    config
        .agents
        .list
        .iter()
        .find(|a| normalize_agent_id(&a.id) == wanted)
}

/// Resolve the agent owning `session_key`.
///
/// Legacy keys are canonicalized against the default agent first, so a bare
/// `main` or `group:<id>` resolves to the default agent. A missing or
/// malformed key, or one naming an agent that is not configured, falls back
/// to the default agent too; only an empty agent list fails.
pub fn resolve_session_agent_id(
    session_key: Option<&str>,
    config: &SwitchboardConfig,
) -> Result<String> {
    let default_id = resolve_default_agent_id(config)?;
    let Some(key) = session_key.map(str::trim).filter(|k| !k.is_empty()) else {
        return Ok(normalize_agent_id(default_id));
    };

    let canonical = match parse_session_key(key) {
        Some(_) => key.to_string(),
        None => canonicalize_session_key_for_agent(key, default_id, &config.session.main_key),
    };

    let Some((agent_id, _)) = parse_session_key(&canonical) else {
        debug!(session_key = %key, "unparseable session key, using default agent");
        return Ok(normalize_agent_id(default_id));
    };
    match resolve_agent_config(config, agent_id) {
        Some(agent) => Ok(normalize_agent_id(&agent.id)),
        None => {
            debug!(
                session_key = %key,
                agent_id,
                default_agent = default_id,
                "session key names an unconfigured agent, using default agent"
            );
            Ok(normalize_agent_id(default_id))
        },
    }
}

/// Where `agent_id` keeps its files.
///
/// An explicit `workspace` wins (with `~` expanded). Otherwise the agent gets
/// `<root>/<agentId>`, where root is `agents.defaults.workspace_root` or
/// `<data_dir>/workspaces`.
pub fn resolve_agent_workspace_dir(config: &SwitchboardConfig, agent_id: &str) -> PathBuf {
    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    let default_root = || switchboard_config::data_dir().join(WORKSPACES_DIR);
    workspace_dir_with(config, agent_id, home.as_deref(), default_root)
}

fn workspace_dir_with(
    config: &SwitchboardConfig,
    agent_id: &str,
    home: Option<&Path>,
    default_root: impl FnOnce() -> PathBuf,
) -> PathBuf {
    if let Some(workspace) = resolve_agent_config(config, agent_id)
        .and_then(|a| a.workspace.as_deref())
        .map(str::trim)
        .filter(|w| !w.is_empty())
    {
        return expand_home(workspace, home);
    }

    let root = match &config.agents.defaults.workspace_root {
        Some(root) => expand_home(&root.to_string_lossy(), home),
        None => default_root(),
    };
    root.join(normalize_agent_id(agent_id))
}

/// Expand a leading `~` or `~/` against `home`. Paths are left alone when
/// the home directory is unknown.
fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (path, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}
