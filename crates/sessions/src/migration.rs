//! Rewrite pre-canonical session identifiers into the `agent:` grammar.
//!
//! Single-agent deployments stored bare keys (`main`, `subagent:x`,
//! `group:<id>`, raw WhatsApp group JIDs). Migration is total and
//! idempotent: every output starts with `agent:`, and `agent:` keys are
//! returned untouched.

use std::sync::LazyLock;

use {regex::Regex, switchboard_common::ChatType, tracing::debug};

use crate::key::{AGENT_PREFIX, MAIN_SCOPE, PeerScope, SUBAGENT_PREFIX, SessionScope, build_session_key};

#[cfg(feature = "metrics")]
use switchboard_metrics::{counter, labels, sessions as session_metrics};

const LEGACY_GROUP_PREFIX: &str = "group:";

#[allow(clippy::expect_used)]
static WHATSAPP_GROUP_JID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+@g\.us$").expect("hardcoded regex"));

#[allow(clippy::expect_used)]
static PREFIXED_GROUP_JID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+):(\d+@g\.us)$").expect("hardcoded regex"));

/// Whether `key` is a group identifier stored before the canonical grammar.
pub fn is_legacy_group_key(key: &str) -> bool {
    if key.starts_with(AGENT_PREFIX) {
        return false;
    }
    key.starts_with(LEGACY_GROUP_PREFIX)
        || WHATSAPP_GROUP_JID.is_match(key)
        || PREFIXED_GROUP_JID.is_match(key)
}

/// Legacy shapes, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegacyShape {
    Canonical,
    Main,
    Subagent,
    Group,
    WhatsAppJid,
    PrefixedJid,
    Wrapped,
}

impl LegacyShape {
    fn classify(key: &str, main_key: &str) -> Self {
        if key.starts_with(AGENT_PREFIX) {
            Self::Canonical
        } else if key.is_empty() || key == main_key {
            Self::Main
        } else if key.starts_with(SUBAGENT_PREFIX) {
            Self::Subagent
        } else if key.starts_with(LEGACY_GROUP_PREFIX) {
            Self::Group
        } else if WHATSAPP_GROUP_JID.is_match(key) {
            Self::WhatsAppJid
        } else if PREFIXED_GROUP_JID.is_match(key) {
            Self::PrefixedJid
        } else {
            Self::Wrapped
        }
    }

    #[cfg(feature = "metrics")]
    fn label(self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Main => "main",
            Self::Subagent => "subagent",
            Self::Group => "group",
            Self::WhatsAppJid => "whatsapp_jid",
            Self::PrefixedJid => "prefixed_jid",
            Self::Wrapped => "wrapped",
        }
    }
}

/// Rewrite `key` into the canonical grammar for `agent_id`.
///
/// | input | output |
/// |---|---|
/// | `agent:...` | unchanged |
/// | `main_key` (or empty) | `agent:<id>:main` |
/// | `subagent:<name>` | `agent:<id>:subagent:<name>` |
/// | `group:<gid>` | `agent:<id>:unknown:group:<gid>` |
/// | `<digits>@g.us` | `agent:<id>:whatsapp:group:<jid>` |
/// | `<platform>:<digits>@g.us` | `agent:<id>:<platform>:group:<jid>` |
/// | anything else | `agent:<id>:<key>` |
pub fn canonicalize_session_key_for_agent(key: &str, agent_id: &str, main_key: &str) -> String {
    let key = key.trim();
    let shape = LegacyShape::classify(key, main_key);

    #[cfg(feature = "metrics")]
    if shape != LegacyShape::Canonical {
        counter!(session_metrics::KEYS_MIGRATED_TOTAL, labels::SHAPE => shape.label()).increment(1);
    }

    match shape {
        LegacyShape::Canonical => key.to_string(),
        LegacyShape::Main => build_session_key(agent_id, &SessionScope::Main),
        // The subagent prefix is already part of the scope grammar.
        LegacyShape::Subagent => format!("{AGENT_PREFIX}{agent_id}:{key}"),
        LegacyShape::Group => {
            let group_id = &key[LEGACY_GROUP_PREFIX.len()..];
            peer_key(agent_id, "unknown", group_id)
        },
        LegacyShape::WhatsAppJid => peer_key(agent_id, "whatsapp", key),
        LegacyShape::PrefixedJid => match PREFIXED_GROUP_JID.captures(key) {
            Some(caps) => peer_key(agent_id, &caps[1], &caps[2]),
            None => wrap(agent_id, key),
        },
        LegacyShape::Wrapped => wrap(agent_id, key),
    }
}

fn peer_key(agent_id: &str, channel: &str, group_id: &str) -> String {
    build_session_key(
        agent_id,
        &SessionScope::Peer(PeerScope::new(channel, ChatType::Group, group_id)),
    )
}

fn wrap(agent_id: &str, key: &str) -> String {
    debug!(key, agent_id, "wrapping unrecognised legacy session key");
    if key == MAIN_SCOPE {
        return build_session_key(agent_id, &SessionScope::Main);
    }
    format!("{AGENT_PREFIX}{agent_id}:{key}")
}
