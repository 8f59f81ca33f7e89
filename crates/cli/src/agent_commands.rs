use {
    anyhow::{Result, bail},
    clap::Subcommand,
    switchboard_config::SwitchboardConfig,
    switchboard_routing::{
        list_agent_ids, resolve_agent_config, resolve_agent_workspace_dir,
        resolve_default_agent_id, resolve_session_agent_id,
    },
};

#[derive(Subcommand)]
pub enum AgentAction {
    /// List configured agent ids; the default is marked with `*`.
    List,
    /// Resolve the agent that owns a session (the default without a key).
    Resolve {
        #[arg(long)]
        session_key: Option<String>,
    },
    /// Print an agent's workspace directory.
    Workspace { agent_id: String },
}

pub fn handle_agent(action: AgentAction, config: &SwitchboardConfig) -> Result<()> {
    match action {
        AgentAction::List => {
            for row in agent_rows(config)? {
                println!("{row}");
            }
        },
        AgentAction::Resolve { session_key } => {
            println!("{}", resolve_session_agent_id(session_key.as_deref(), config)?);
        },
        AgentAction::Workspace { agent_id } => {
            println!("{}", resolve_agent_workspace_dir(config, &agent_id).display());
        },
    }
    Ok(())
}

/// One `<marker> <id>\t<name>` line per agent, in declaration order.
fn agent_rows(config: &SwitchboardConfig) -> Result<Vec<String>> {
    let ids = list_agent_ids(config);
    if ids.is_empty() {
        bail!("no agents configured");
    }
    let default = resolve_default_agent_id(config)?;
    Ok(ids
        .into_iter()
        .map(|id| {
            let marker = if id == default { "*" } else { " " };
            let name = resolve_agent_config(config, id)
                .and_then(|agent| agent.name.as_deref())
                .unwrap_or("");
            format!("{marker} {id}\t{name}")
        })
        .collect())
}
