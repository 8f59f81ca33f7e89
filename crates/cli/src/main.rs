mod agent_commands;
mod config_commands;
mod inbound_commands;
mod session_commands;
mod target_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    switchboard_config::SwitchboardConfig,
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "switchboard", about = "Switchboard: session keys, targets and inbound routing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the default locations.
    #[arg(long, global = true, env = "SWITCHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Custom data directory (default agent workspaces live under it).
    #[arg(long, global = true, env = "SWITCHBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Session key tools.
    Key {
        #[command(subcommand)]
        action: session_commands::KeyAction,
    },
    /// History window tools.
    History {
        #[command(subcommand)]
        action: session_commands::HistoryAction,
    },
    /// Parse platform addresses and outbound routes.
    Target {
        #[command(subcommand)]
        action: target_commands::TargetAction,
    },
    /// Agent scope resolution.
    Agent {
        #[command(subcommand)]
        action: agent_commands::AgentAction,
    },
    /// Configuration checks.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
    /// Drive the inbound pipeline.
    Inbound {
        #[command(subcommand)]
        action: inbound_commands::InboundAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output on stdout stays machine-readable.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SwitchboardConfig> {
    match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            switchboard_config::load_config(path)
        },
        None => Ok(switchboard_config::discover_and_load()),
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    if let Some(dir) = &cli.data_dir {
        switchboard_config::set_data_dir(dir.clone());
    }
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Key { action } => session_commands::handle_key(action, &config),
        Commands::History { action } => session_commands::handle_history(action, &config),
        Commands::Target { action } => target_commands::handle_target(action, &config),
        Commands::Agent { action } => agent_commands::handle_agent(action, &config),
        Commands::Config { action } => config_commands::handle_config(action, &config),
        Commands::Inbound { action } => inbound_commands::handle_inbound(action, config).await,
    }
}
