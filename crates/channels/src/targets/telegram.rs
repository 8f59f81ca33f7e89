//! Telegram delivery targets.
//!
//! Accepted forms, after internal prefixes (`telegram:`, `tg:`, and a
//! `group:` segment following either) are stripped:
//!
//! - `<chatId>`
//! - `<chatId>:topic:<threadId>` (preferred topic syntax)
//! - `<chatId>:<threadId>` (legacy; tried after the `:topic:` form)
//!
//! A thread suffix too large for an `i64` is an invalid target.

use std::sync::LazyLock;

use {regex::Regex, serde::Serialize, switchboard_common::ChatType};

use {
    super::starts_with_ignore_case,
    crate::{Error, Result},
};

const TELEGRAM_PREFIXES: &[&str] = &["telegram:", "tg:"];
const GROUP_SEGMENT: &str = "group:";

#[allow(clippy::expect_used)]
static TOPIC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?):topic:(\d+)$").expect("hardcoded regex"));

#[allow(clippy::expect_used)]
static NUMERIC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+):(\d+)$").expect("hardcoded regex"));

#[allow(clippy::expect_used)]
static NUMERIC_CHAT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("hardcoded regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelegramTarget {
    pub chat_id: String,
    /// Forum topic to post into.
    pub message_thread_id: Option<i64>,
    pub chat_type: ChatType,
}

/// Strip `telegram:`/`tg:` prefixes repeatedly. Once one has been stripped,
/// a following `group:` segment is stripped too.
pub fn strip_telegram_internal_prefixes(to: &str) -> &str {
    let mut rest = to.trim();
    let mut stripped_telegram = false;
    loop {
        let mut found = false;
        if let Some(prefix) = TELEGRAM_PREFIXES
            .iter()
            .find(|p| starts_with_ignore_case(rest, p))
        {
            rest = rest[prefix.len()..].trim();
            stripped_telegram = true;
            found = true;
        }
        if stripped_telegram && starts_with_ignore_case(rest, GROUP_SEGMENT) {
            rest = rest[GROUP_SEGMENT.len()..].trim();
            found = true;
        }
        if !found {
            return rest;
        }
    }
}

/// Chat type implied by a chat id: negative numbers are groups, other
/// numbers are private chats, usernames and links are unknown.
fn chat_type_for(chat_id: &str) -> ChatType {
    let chat_id = chat_id.trim();
    if !NUMERIC_CHAT_ID.is_match(chat_id) {
        return ChatType::Unknown;
    }
    if chat_id.starts_with('-') {
        ChatType::Group
    } else {
        ChatType::Direct
    }
}

/// Split a thread suffix off `value`. A suffix that matches but does not fit
/// a Telegram thread id is an error rather than part of the chat id.
fn split_thread<'a>(pattern: &Regex, value: &'a str) -> Result<Option<(&'a str, i64)>> {
    let Some(caps) = pattern.captures(value) else {
        return Ok(None);
    };
    let (Some(chat), Some(thread)) = (caps.get(1), caps.get(2)) else {
        return Ok(None);
    };
    let thread = thread.as_str().parse().map_err(|_| {
        Error::invalid_target(format!(
            "Telegram topic id \"{}\" is out of range.",
            thread.as_str()
        ))
    })?;
    Ok(Some((chat.as_str(), thread)))
}

pub fn parse_telegram_target(to: &str) -> Result<TelegramTarget> {
    let normalized = strip_telegram_internal_prefixes(to);

    let split = match split_thread(&TOPIC_SUFFIX, normalized)? {
        Some(split) => Some(split),
        None => split_thread(&NUMERIC_SUFFIX, normalized)?,
    };
    let (chat_id, message_thread_id) =
        split.map_or((normalized, None), |(chat, thread)| (chat, Some(thread)));

    Ok(TelegramTarget {
        chat_id: chat_id.to_string(),
        message_thread_id,
        chat_type: chat_type_for(chat_id),
    })
}

/// Chat type of `target`; unparseable targets are [`ChatType::Unknown`].
pub fn resolve_telegram_target_chat_type(target: &str) -> ChatType {
    parse_telegram_target(target).map_or(ChatType::Unknown, |t| t.chat_type)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("123456", "123456", None, ChatType::Direct)]
    #[case("-100123", "-100123", None, ChatType::Group)]
    #[case("telegram:group:-100123", "-100123", None, ChatType::Group)]
    #[case("tg:telegram:-100123", "-100123", None, ChatType::Group)]
    #[case("-100123:topic:42", "-100123", Some(42), ChatType::Group)]
    #[case("-100123:42", "-100123", Some(42), ChatType::Group)]
    #[case("@mychannel", "@mychannel", None, ChatType::Unknown)]
    #[case("@mychannel:topic:7", "@mychannel", Some(7), ChatType::Unknown)]
    #[case("TELEGRAM: 555 ", "555", None, ChatType::Direct)]
    fn parses(
        #[case] raw: &str,
        #[case] chat_id: &str,
        #[case] thread: Option<i64>,
        #[case] chat_type: ChatType,
    ) {
        let target = parse_telegram_target(raw).unwrap();
        assert_eq!(target.chat_id, chat_id);
        assert_eq!(target.message_thread_id, thread);
        assert_eq!(target.chat_type, chat_type);
    }

    #[test]
    fn group_segment_needs_telegram_prefix() {
        assert_eq!(strip_telegram_internal_prefixes("group:-100"), "group:-100");
        assert_eq!(resolve_telegram_target_chat_type("group:-100"), ChatType::Unknown);
    }

    #[test]
    fn topic_marker_wins_over_numeric_suffix() {
        let target = parse_telegram_target("-100:topic:5").unwrap();
        assert_eq!(target.chat_id, "-100");
        assert_eq!(target.message_thread_id, Some(5));
    }

    #[test]
    fn empty_target_is_unknown() {
        let target = parse_telegram_target("  ").unwrap();
        assert_eq!(target.chat_id, "");
        assert_eq!(target.chat_type, ChatType::Unknown);
    }

    #[rstest]
    #[case("-100123:topic:99999999999999999999")]
    #[case("-100123:99999999999999999999")]
    fn oversized_thread_id_is_rejected(#[case] raw: &str) {
        let err = parse_telegram_target(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
        assert!(err.to_string().contains("99999999999999999999"));
        assert_eq!(resolve_telegram_target_chat_type(raw), ChatType::Unknown);
    }
}
