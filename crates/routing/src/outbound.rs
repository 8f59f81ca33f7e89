//! Session routes for messages the agent sends on its own initiative (cron
//! jobs, tool calls), where only a platform and a raw recipient are known.

use {
    serde::Serialize,
    switchboard_channels::{
        GENERIC, MessagingTarget, ParseOptions, Result as TargetResult, TargetKind,
        normalize_whatsapp_target, parse_discord_target, parse_slack_target,
        parse_telegram_target,
    },
    switchboard_common::{ChannelType, ChatType},
    switchboard_config::SwitchboardConfig,
    switchboard_sessions::{PeerScope, SessionKey, normalize_agent_id},
    tracing::debug,
};

use crate::agent_scope::resolve_default_agent_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundSessionRoute {
    pub session_key: SessionKey,
    pub chat_type: ChatType,
    pub peer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Resolve the session an outbound message to `target` on `channel` belongs
/// to. `agent_id` defaults to the configured default agent.
///
/// Returns `None` for blank or unparseable targets, and when no agent can be
/// determined.
pub fn resolve_outbound_session_route(
    config: &SwitchboardConfig,
    channel: &str,
    agent_id: Option<&str>,
    target: &str,
) -> Option<OutboundSessionRoute> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    let agent_id = match agent_id.map(str::trim).filter(|a| !a.is_empty()) {
        Some(id) => normalize_agent_id(id),
        None => match resolve_default_agent_id(config) {
            Ok(id) => normalize_agent_id(id),
            Err(error) => {
                debug!(channel, %error, "no agent for outbound route");
                return None;
            },
        },
    };

    let channel = channel.trim().to_ascii_lowercase();
    let (chat_type, peer_id, thread_id) = match channel.parse::<ChannelType>() {
        Ok(ChannelType::Telegram) => {
            let parsed = match parse_telegram_target(target) {
                Ok(parsed) => parsed,
                Err(error) => {
                    debug!(channel, %error, "outbound target rejected");
                    return None;
                },
            };
            if parsed.chat_id.is_empty() {
                return None;
            }
            let thread = parsed.message_thread_id.map(|t| t.to_string());
            (parsed.chat_type, parsed.chat_id, thread)
        },
        Ok(ChannelType::WhatsApp) => {
            let parsed = normalize_whatsapp_target(target)?;
            (parsed.chat_type, parsed.id, None)
        },
        Ok(ChannelType::Discord) => {
            from_messaging_target(&channel, parse_discord_target(target, &channel_default()))?
        },
        Ok(ChannelType::Slack) => {
            from_messaging_target(&channel, parse_slack_target(target, &channel_default()))?
        },
        Err(_) => from_messaging_target(&channel, GENERIC.parse(target, &ParseOptions::default()))?,
    };

    let mut peer = PeerScope::new(channel.as_str(), chat_type, peer_id.as_str());
    peer.thread_id = thread_id.clone();
    Some(OutboundSessionRoute {
        session_key: SessionKey::peer(&agent_id, peer),
        chat_type,
        peer_id,
        thread_id,
    })
}

/// Bare numeric ids are posted to as channels unless prefixed otherwise.
fn channel_default() -> ParseOptions {
    ParseOptions::with_default_kind(TargetKind::Channel)
}

fn from_messaging_target(
    channel: &str,
    parsed: TargetResult<Option<MessagingTarget>>,
) -> Option<(ChatType, String, Option<String>)> {
    let target = match parsed {
        Ok(target) => target?,
        Err(error) => {
            debug!(channel, %error, "outbound target rejected");
            return None;
        },
    };
    let chat_type = match target.kind {
        TargetKind::User => ChatType::Direct,
        TargetKind::Channel => ChatType::Channel,
    };
    Some((chat_type, target.id, None))
}
