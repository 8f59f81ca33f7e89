//! Slack addresses: `<@U123>`, `user:U123`, `channel:C123`, `@U123`,
//! `#C123`, `slack:U123`, or a bare id.

use std::sync::LazyLock;

use regex::Regex;

use {
    super::{
        ALNUM_ID, MessagingTarget, ParseOptions, TargetGrammar, TargetKind, TargetRule,
        require_target_kind,
    },
    crate::Result,
};

#[allow(clippy::expect_used)]
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<@([A-Z0-9]+)>$").expect("hardcoded regex"));

static RULES: &[TargetRule] = &[
    TargetRule::Pattern {
        pattern: &MENTION,
        kind: TargetKind::User,
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
        id_pattern: &ALNUM_ID,
        error: "Slack DMs require a user id (use user:<id> or <@id>)",
    },
    TargetRule::Sigil {
        sigil: '#',
        kind: TargetKind::Channel,
        id_pattern: &ALNUM_ID,
        error: "Slack channels require a channel id (use channel:<id>)",
    },
];

/// `slack:<id>` always names a user.
pub static SLACK: TargetGrammar = TargetGrammar {
    platform: "Slack",
    channel_prefixes: &["slack:"],
    prefixed_kind: Some(TargetKind::User),
    rules: RULES,
    default_kind: TargetKind::Channel,
};

pub fn parse_slack_target(raw: &str, options: &ParseOptions) -> Result<Option<MessagingTarget>> {
    SLACK.parse(raw, options)
}

/// Resolve a channel id, treating bare ids as channels.
pub fn resolve_slack_channel_id(raw: &str) -> Result<String> {
    let target = parse_slack_target(raw, &ParseOptions::with_default_kind(TargetKind::Channel))?;
    require_target_kind(SLACK.platform, target.as_ref(), TargetKind::Channel).map(str::to_string)
}
