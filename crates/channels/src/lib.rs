//! Address parsing for chat platforms.
//!
//! Every platform has its own way of writing "who to talk to": Slack
//! mentions, Discord snowflakes, Telegram chat ids with topic suffixes,
//! WhatsApp JIDs. The parsers here turn those raw strings into a
//! [`MessagingTarget`] (or a platform-specific target) so that session keys
//! can be built from one normalized shape.

pub mod error;
pub mod targets;

pub use {
    error::{Error, Result},
    targets::{
        GENERIC, MessagingTarget, ParseOptions, TargetGrammar, TargetKind, TargetRule,
        build_messaging_target, ensure_target_id, normalize_target_id, require_target_kind,
        strip_channel_prefixes,
        discord::parse_discord_target,
        slack::{parse_slack_target, resolve_slack_channel_id},
        telegram::{
            TelegramTarget, parse_telegram_target, resolve_telegram_target_chat_type,
            strip_telegram_internal_prefixes,
        },
        whatsapp::{WhatsAppTarget, is_whatsapp_group_jid, normalize_whatsapp_target},
    },
};
