//! Per-session history windows.
//!
//! The limit for a session comes from the `channels.<platform>` config tree:
//!
//! 1. `dms.<peerId>.history_limit` (direct chats only)
//! 2. `dm_history_limit` (direct chats only)
//! 3. `history_limit`
//!
//! The first tier that yields a value wins. No value means unlimited.

use {switchboard_config::SwitchboardConfig, tracing::debug};

use crate::{
    key::{AGENT_PREFIX, PeerScope, SessionScope, parse_session_key},
    message::HistoryMessage,
};

/// Resolve how many turns of history a session may see.
///
/// Keys without the `agent:` prefix are read as a bare scope
/// (`telegram:dm:42`). Returns `None` when either argument is missing, the
/// key does not name a platform conversation, or nothing is configured.
pub fn get_history_limit_from_session_key(
    session_key: Option<&str>,
    config: Option<&SwitchboardConfig>,
) -> Option<u32> {
    let (session_key, config) = (session_key?, config?);
    let peer = peer_scope(session_key)?;
    let channel = config.channels.get(&peer.channel)?;

    let limit = if peer.chat_type.is_direct() {
        channel
            .dms
            .get(&peer.peer_id)
            .and_then(|dm| dm.history_limit)
            .or(channel.dm_history_limit)
            .or(channel.history_limit)
    } else {
        channel.history_limit
    };

    debug!(
        session_key,
        platform = %peer.channel,
        chat_type = %peer.chat_type,
        limit = ?limit,
        "resolved history limit"
    );
    limit
}

fn peer_scope(session_key: &str) -> Option<PeerScope> {
    let scope = if session_key.starts_with(AGENT_PREFIX) {
        parse_session_key(session_key)?.1
    } else {
        SessionScope::parse(session_key)
    };
    match scope {
        SessionScope::Peer(peer) => Some(peer),
        _ => None,
    }
}

/// Keep only the last `limit` turns of `messages`.
///
/// A turn is a user message plus every non-user message after it, up to the
/// next user message. Non-user messages before the first user message belong
/// to no turn and are dropped whenever trimming happens.
///
/// When `limit` is `None` or `0`, or there are at most `limit` turns, the
/// input slice itself is returned, so callers can test
/// `std::ptr::eq(out, messages)` to see whether anything was cut.
pub fn limit_history_turns<M: HistoryMessage>(messages: &[M], limit: Option<u32>) -> &[M] {
    let Some(limit) = limit.filter(|l| *l > 0) else {
        return messages;
    };

    let mut turn_starts = messages
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, m)| m.is_user_turn())
        .map(|(idx, _)| idx);
    let cut = turn_starts.nth(limit as usize - 1);
    match (cut, turn_starts.next()) {
        (Some(cut), Some(_)) => &messages[cut..],
        _ => messages,
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::message::HistoryEntry,
        switchboard_config::{ChannelConfig, DmConfig},
    };

    fn config() -> SwitchboardConfig {
        let mut cfg = SwitchboardConfig::default();
        let mut telegram = ChannelConfig {
            dm_history_limit: Some(10),
            history_limit: Some(50),
            ..Default::default()
        };
        telegram.dms.insert("user123".into(), DmConfig {
            history_limit: Some(5),
        });
        cfg.channels.insert("telegram", telegram);
        cfg.channels.insert("slack", ChannelConfig {
            dm_history_limit: Some(20),
            ..Default::default()
        });
        cfg.channels.insert("discord", ChannelConfig {
            history_limit: Some(30),
            ..Default::default()
        });
        cfg
    }

    #[test]
    fn missing_key_or_config_is_unlimited() {
        let cfg = config();
        assert_eq!(get_history_limit_from_session_key(None, Some(&cfg)), None);
        assert_eq!(get_history_limit_from_session_key(Some("key"), None), None);
    }

    #[test]
    fn default_dm_limit() {
        let cfg = config();
        let limit =
            get_history_limit_from_session_key(Some("agent:main:telegram:dm:user456"), Some(&cfg));
        assert_eq!(limit, Some(10));
    }

    #[test]
    fn per_peer_dm_override() {
        let cfg = config();
        let limit = get_history_limit_from_session_key(
            Some("agent:main:telegram:direct:user123"),
            Some(&cfg),
        );
        assert_eq!(limit, Some(5));
    }

    #[test]
    fn group_uses_general_limit() {
        let cfg = config();
        let limit = get_history_limit_from_session_key(
            Some("agent:main:telegram:group:-100123"),
            Some(&cfg),
        );
        assert_eq!(limit, Some(50));
    }

    #[test]
    fn thread_suffix_is_ignored_for_peer_lookup() {
        let cfg = config();
        let limit = get_history_limit_from_session_key(
            Some("agent:main:telegram:direct:user123:thread:999"),
            Some(&cfg),
        );
        assert_eq!(limit, Some(5));
    }

    #[test]
    fn direct_falls_back_to_general_limit() {
        let cfg = config();
        let limit =
            get_history_limit_from_session_key(Some("agent:main:discord:direct:77"), Some(&cfg));
        assert_eq!(limit, Some(30));
    }

    #[test]
    fn dm_limit_does_not_apply_to_channels() {
        let cfg = config();
        assert_eq!(
            get_history_limit_from_session_key(Some("agent:main:slack:channel:C1"), Some(&cfg)),
            None
        );
        assert_eq!(
            get_history_limit_from_session_key(Some("agent:main:slack:direct:U1"), Some(&cfg)),
            Some(20)
        );
    }

    #[test]
    fn bare_scope_keys_resolve() {
        let cfg = config();
        assert_eq!(
            get_history_limit_from_session_key(Some("telegram:dm:user123"), Some(&cfg)),
            Some(5)
        );
    }

    #[test]
    fn unconfigured_or_non_peer_scopes_are_unlimited() {
        let cfg = config();
        assert_eq!(get_history_limit_from_session_key(Some("agent:main:main"), Some(&cfg)), None);
        assert_eq!(
            get_history_limit_from_session_key(Some("agent:main:whatsapp:group:1@g.us"), Some(&cfg)),
            None
        );
    }

    fn transcript(roles: &str) -> Vec<HistoryEntry> {
        roles
            .chars()
            .enumerate()
            .map(|(i, role)| match role {
                'u' => HistoryEntry::user(i.to_string()),
                's' => HistoryEntry::System {
                    content: i.to_string(),
                },
                _ => HistoryEntry::assistant(i.to_string()),
            })
            .collect()
    }

    #[test]
    fn no_limit_returns_same_slice() {
        let messages = transcript("ua");
        assert!(std::ptr::eq(limit_history_turns(&messages, None), messages.as_slice()));
        assert!(std::ptr::eq(limit_history_turns(&messages, Some(0)), messages.as_slice()));
    }

    #[test]
    fn keeps_last_user_turns() {
        let messages = transcript("uauaua");
        let limited = limit_history_turns(&messages, Some(2));
        assert_eq!(limited.len(), 4);
        assert_eq!(limited[0].content(), "2");
        assert_eq!(limited[2].content(), "4");
    }

    #[test]
    fn fewer_turns_than_limit_returns_same_slice() {
        let messages = transcript("ua");
        assert!(std::ptr::eq(limit_history_turns(&messages, Some(5)), messages.as_slice()));
    }

    #[test]
    fn exact_turn_count_returns_same_slice() {
        let messages = transcript("suaua");
        let limited = limit_history_turns(&messages, Some(2));
        assert!(std::ptr::eq(limited, messages.as_slice()));
        assert_eq!(limited.len(), 5);
    }

    #[test]
    fn leading_non_user_messages_dropped_when_trimming() {
        let messages = transcript("sauauaua");
        let limited = limit_history_turns(&messages, Some(2));
        assert_eq!(limited.len(), 4);
        assert!(limited[0].is_user_turn());
        assert_eq!(limited[0].content(), "4");
    }

    #[test]
    fn multi_message_turns_stay_whole() {
        let messages = transcript("uaaauaa");
        let limited = limit_history_turns(&messages, Some(1));
        assert_eq!(limited.len(), 3);
        assert_eq!(limited[0].content(), "4");
    }
}
