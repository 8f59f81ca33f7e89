//! Inbound message handling between channel adapters and agents.
//!
//! Flow: adapter event → [`InboundPipeline::push`] → per-conversation
//! debounce → batch summary → [`AgentTurn`] → [`AgentTurnExecutor`].

pub mod command;
pub mod debounce;
pub mod event;
pub mod inbound_batch;
pub mod pipeline;

use switchboard_config::SwitchboardConfig;

pub use {
    command::{BUILTIN_COMMANDS, has_control_command},
    debounce::{DebounceConfig, InboundDebouncer},
    event::{
        Attachment, DiscordInbound, InboundEvent, SlackInbound, TelegramInbound, WhatsAppInbound,
    },
    inbound_batch::{DEFAULT_SEPARATOR, InboundBatch, InboundEntry, summarize_inbound_batch},
    pipeline::{AgentTurn, AgentTurnExecutor, InboundPipeline, build_turn},
};

/// Debounce window for `channel`, in milliseconds.
///
/// Precedence: `messages.inbound.by_channel.<channel>`, then
/// `channels.<channel>.debounce_ms`, then `messages.inbound.debounce_ms`.
/// Zero disables batching.
pub fn resolve_inbound_debounce_ms(config: &SwitchboardConfig, channel: &str) -> u64 {
    let inbound = &config.messages.inbound;
    inbound
        .by_channel
        .get(channel)
        .or_else(|| {
            inbound
                .by_channel
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(channel))
                .map(|(_, ms)| ms)
        })
        .copied()
        .or_else(|| config.channels.get(channel).and_then(|c| c.debounce_ms))
        .unwrap_or(inbound.debounce_ms)
}
