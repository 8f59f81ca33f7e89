//! WhatsApp recipients: E.164 phone numbers and group JIDs.

use std::sync::LazyLock;

use {regex::Regex, serde::Serialize, switchboard_common::ChatType};

use super::strip_channel_prefixes;

const WHATSAPP_PREFIXES: &[&str] = &["whatsapp:", "wa:"];
const USER_JID_HOSTS: &[&str] = &["@s.whatsapp.net", "@c.us"];

#[allow(clippy::expect_used)]
static GROUP_JID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+(-\d+)?@g\.us$").expect("hardcoded regex"));

#[allow(clippy::expect_used)]
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?(\d{3,})$").expect("hardcoded regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsAppTarget {
    /// `+<digits>` for people, the JID for groups.
    pub id: String,
    pub chat_type: ChatType,
}

pub fn is_whatsapp_group_jid(value: &str) -> bool {
    GROUP_JID.is_match(value.trim())
}

/// Normalise a recipient. Returns `None` when nothing usable is left.
pub fn normalize_whatsapp_target(raw: &str) -> Option<WhatsAppTarget> {
    let value = strip_channel_prefixes(raw, WHATSAPP_PREFIXES);
    if value.is_empty() {
        return None;
    }
    if is_whatsapp_group_jid(value) {
        return Some(WhatsAppTarget {
            id: value.to_string(),
            chat_type: ChatType::Group,
        });
    }

    let local = USER_JID_HOSTS
        .iter()
        .find_map(|host| {
            let split = value.len().checked_sub(host.len())?;
            value
                .get(split..)
                .filter(|tail| tail.eq_ignore_ascii_case(host))
                .map(|_| &value[..split])
        })
        .unwrap_or(value);
    let digits: String = local.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')')).collect();
    let caps = PHONE.captures(&digits)?;
    Some(WhatsAppTarget {
        id: format!("+{}", &caps[1]),
        chat_type: ChatType::Direct,
    })
}
