use {
    anyhow::{Context, Result, bail},
    clap::{Subcommand, ValueEnum},
    serde_json::json,
    switchboard_channels::{
        GENERIC, ParseOptions, TargetKind, parse_discord_target, parse_slack_target,
        normalize_whatsapp_target, parse_telegram_target,
    },
    switchboard_common::ChannelType,
    switchboard_config::SwitchboardConfig,
    switchboard_routing::resolve_outbound_session_route,
};

#[derive(Subcommand)]
pub enum TargetAction {
    /// Parse a raw platform address.
    Parse {
        /// Platform name (discord, slack, telegram, whatsapp); anything else
        /// uses the generic `user:`/`channel:` grammar.
        platform: String,
        raw: String,
        /// Kind to assume when the address does not say.
        #[arg(long, value_enum)]
        default_kind: Option<KindArg>,
    },
    /// Resolve the session an outbound send to `target` lands in.
    Route {
        channel: String,
        target: String,
        /// Sending agent (default: the configured default agent).
        #[arg(long)]
        agent: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    User,
    Channel,
}

impl From<KindArg> for TargetKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::User => Self::User,
            KindArg::Channel => Self::Channel,
        }
    }
}

pub fn handle_target(action: TargetAction, config: &SwitchboardConfig) -> Result<()> {
    match action {
        TargetAction::Parse {
            platform,
            raw,
            default_kind,
        } => crate::print_json(&parse_target(&platform, &raw, default_kind)?),
        TargetAction::Route {
            channel,
            target,
            agent,
        } => {
            let route =
                resolve_outbound_session_route(config, &channel, agent.as_deref(), &target)
                    .with_context(|| format!("no session route for {channel} target {target:?}"))?;
            crate::print_json(&route)
        },
    }
}

fn parse_target(
    platform: &str,
    raw: &str,
    default_kind: Option<KindArg>,
) -> Result<serde_json::Value> {
    let options = ParseOptions {
        default_kind: default_kind.map(TargetKind::from),
    };
    let parsed = match platform.parse::<ChannelType>() {
        Ok(ChannelType::Telegram) => return Ok(json!(parse_telegram_target(raw)?)),
        Ok(ChannelType::WhatsApp) => {
            let Some(target) = normalize_whatsapp_target(raw) else {
                bail!("not a WhatsApp phone number or group JID: {raw:?}");
            };
            return Ok(json!(target));
        },
        Ok(ChannelType::Discord) => parse_discord_target(raw, &options)?,
        Ok(ChannelType::Slack) => parse_slack_target(raw, &options)?,
        Err(_) => GENERIC.parse(raw, &options)?,
    };
    match parsed {
        Some(target) => Ok(json!(target)),
        None => bail!("empty target"),
    }
}
