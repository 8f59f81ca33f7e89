use {
    anyhow::{Context, Result},
    clap::Subcommand,
    serde_json::json,
    switchboard_config::SwitchboardConfig,
    switchboard_routing::resolve_default_agent_id,
    switchboard_sessions::{
        SessionScope, canonicalize_session_key_for_agent, get_history_limit_from_session_key,
        is_legacy_group_key, parse_session_key,
    },
};

#[derive(Subcommand)]
pub enum KeyAction {
    /// Rewrite a legacy key into the canonical `agent:` grammar.
    Canonicalize {
        key: String,
        /// Owning agent (default: the configured default agent).
        #[arg(long)]
        agent: Option<String>,
        /// Legacy main-session key (default: `session.main_key`).
        #[arg(long)]
        main_key: Option<String>,
    },
    /// Decompose a canonical key.
    Parse { key: String },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Resolve the history turn limit for a session.
    Limit { session_key: String },
}

pub fn handle_key(action: KeyAction, config: &SwitchboardConfig) -> Result<()> {
    match action {
        KeyAction::Canonicalize {
            key,
            agent,
            main_key,
        } => {
            let agent = match agent {
                Some(agent) => agent,
                None => resolve_default_agent_id(config)
                    .context("pass --agent or configure agents.list")?
                    .to_string(),
            };
            let main_key = main_key.as_deref().unwrap_or(&config.session.main_key);
            println!("{}", canonicalize_session_key_for_agent(&key, &agent, main_key));
            Ok(())
        },
        KeyAction::Parse { key } => {
            let (agent_id, scope) = parse_session_key(key.trim())
                .with_context(|| format!("not a canonical session key: {key}"))?;
            crate::print_json(&scope_json(agent_id, &scope, is_legacy_group_key(&key)))
        },
    }
}

fn scope_json(agent_id: &str, scope: &SessionScope, legacy: bool) -> serde_json::Value {
    let detail = match scope {
        SessionScope::Main => json!({ "kind": "main" }),
        SessionScope::Subagent(name) => json!({ "kind": "subagent", "name": name }),
        SessionScope::Peer(peer) => json!({
            "kind": "peer",
            "channel": peer.channel,
            "chat_type": peer.chat_type,
            "peer_id": peer.peer_id,
            "thread_id": peer.thread_id,
        }),
        SessionScope::Other(rest) => json!({ "kind": "other", "rest": rest }),
    };
    json!({ "agent_id": agent_id, "scope": detail, "legacy_group": legacy })
}

pub fn handle_history(action: HistoryAction, config: &SwitchboardConfig) -> Result<()> {
    match action {
        HistoryAction::Limit { session_key } => {
            match get_history_limit_from_session_key(Some(&session_key), Some(config)) {
                Some(limit) => println!("{limit}"),
                None => println!("unlimited"),
            }
            Ok(())
        },
    }
}
