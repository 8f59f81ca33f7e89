//! Discord addresses. Snowflakes are numeric for both users and channels; a
//! bare number takes the caller's default kind, else it names a channel.

use std::sync::LazyLock;

use regex::Regex;

use {
    super::{DIGITS_ID, MessagingTarget, ParseOptions, TargetGrammar, TargetKind, TargetRule},
    crate::Result,
};

#[allow(clippy::expect_used)]
static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?(\d+)>$").expect("hardcoded regex"));

#[allow(clippy::expect_used)]
static CHANNEL_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<#(\d+)>$").expect("hardcoded regex"));

static RULES: &[TargetRule] = &[
    TargetRule::Pattern {
        pattern: &USER_MENTION,
        kind: TargetKind::User,
    },
    TargetRule::Pattern {
        pattern: &CHANNEL_MENTION,
        kind: TargetKind::Channel,
    },
    TargetRule::Prefix {
        prefix: "user:",
        kind: TargetKind::User,
    },
    TargetRule::Prefix {
        prefix: "channel:",
        kind: TargetKind::Channel,
    },
    TargetRule::Sigil {
        sigil: '@',
        kind: TargetKind::User,
        id_pattern: &DIGITS_ID,
        error: "Discord DMs require a user id (use user:<id> or a <@id> mention)",
    },
    TargetRule::Sigil {
        sigil: '#',
        kind: TargetKind::Channel,
        id_pattern: &DIGITS_ID,
        error: "Discord channels require a channel id (use channel:<id> or a <#id> mention)",
    },
];

/// `discord:<id>` names a user, like Slack's prefix form.
pub static DISCORD: TargetGrammar = TargetGrammar {
    platform: "Discord",
    channel_prefixes: &["discord:"],
    prefixed_kind: Some(TargetKind::User),
    rules: RULES,
    default_kind: TargetKind::Channel,
};

pub fn parse_discord_target(raw: &str, options: &ParseOptions) -> Result<Option<MessagingTarget>> {
    DISCORD.parse(raw, options)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("<@123>", TargetKind::User, "123")]
    #[case("<@!123>", TargetKind::User, "123")]
    #[case("<#456>", TargetKind::Channel, "456")]
    #[case("user:789", TargetKind::User, "789")]
    #[case("channel:10", TargetKind::Channel, "10")]
    #[case("discord:11", TargetKind::User, "11")]
    #[case("@12", TargetKind::User, "12")]
    #[case("#13", TargetKind::Channel, "13")]
    #[case("general", TargetKind::Channel, "general")]
    fn parses(#[case] raw: &str, #[case] kind: TargetKind, #[case] id: &str) {
        let target = parse_discord_target(raw, &ParseOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!((target.kind, target.id.as_str()), (kind, id));
    }

    #[test]
    fn bare_snowflake_is_a_channel() {
        let target = parse_discord_target("123456", &ParseOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(target.kind, TargetKind::Channel);
        assert_eq!(target.normalized, "channel:123456");
    }

    #[test]
    fn bare_snowflake_uses_default_kind() {
        let target =
            parse_discord_target("123456", &ParseOptions::with_default_kind(TargetKind::User))
                .unwrap()
                .unwrap();
        assert_eq!(target.kind, TargetKind::User);
    }

    #[test]
    fn sigil_requires_digits() {
        let err = parse_discord_target("@someone", &ParseOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("Discord DMs require a user id"));
    }
}
