//! Generic messaging-target parsing.
//!
//! Each platform describes its address syntax as a [`TargetGrammar`]: the
//! channel prefixes it strips, then an ordered list of [`TargetRule`]s tried
//! first to last, then a default kind. Precedence lives in the rule tables,
//! so it can be read (and tested) without following control flow.

pub mod discord;
pub mod slack;
pub mod telegram;
pub mod whatsapp;

use std::{fmt, sync::LazyLock};

use {
    regex::Regex,
    serde::{Deserialize, Serialize},
};

use crate::{Error, Result};

/// Who a target addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    User,
    Channel,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Channel => "channel",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed address. Only built through [`build_messaging_target`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagingTarget {
    pub kind: TargetKind,
    pub id: String,
    /// The trimmed input this target was parsed from.
    pub raw: String,
    /// `lowercase(kind:id)`, suitable as a lookup key.
    pub normalized: String,
}

/// Caller overrides for a single parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Kind to use when no rule decides; replaces the platform default.
    pub default_kind: Option<TargetKind>,
}

impl ParseOptions {
    pub fn with_default_kind(kind: TargetKind) -> Self {
        Self {
            default_kind: Some(kind),
        }
    }
}

pub fn normalize_target_id(kind: TargetKind, id: &str) -> String {
    format!("{kind}:{id}").to_lowercase()
}

pub fn build_messaging_target(kind: TargetKind, id: &str, raw: &str) -> MessagingTarget {
    MessagingTarget {
        kind,
        id: id.to_string(),
        raw: raw.to_string(),
        normalized: normalize_target_id(kind, id),
    }
}

/// Validate `candidate` against `pattern`, failing with `error_message`.
pub fn ensure_target_id<'a>(
    candidate: &'a str,
    pattern: &Regex,
    error_message: &str,
) -> Result<&'a str> {
    if pattern.is_match(candidate) {
        Ok(candidate)
    } else {
        Err(Error::invalid_target(error_message))
    }
}

/// Return the target id if `target` exists and has `kind`.
pub fn require_target_kind<'a>(
    platform: &str,
    target: Option<&'a MessagingTarget>,
    kind: TargetKind,
) -> Result<&'a str> {
    match target {
        None => Err(Error::invalid_target(format!("{platform} {kind} id is required."))),
        Some(t) if t.kind != kind => Err(Error::invalid_target(format!(
            "{platform} {kind} id is required (use {kind}:<id>)."
        ))),
        Some(t) => Ok(&t.id),
    }
}

/// Strip any of `prefixes` from the front of `to`, case-insensitively, until
/// none match. Handles doubled prefixes such as `slack:slack:U1`.
pub fn strip_channel_prefixes<'a>(to: &'a str, prefixes: &[&str]) -> &'a str {
    let mut rest = to.trim();
    while let Some(prefix) = prefixes.iter().find(|p| starts_with_ignore_case(rest, p)) {
        rest = rest[prefix.len()..].trim();
    }
    rest
}

pub(crate) fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// One step of a platform's address syntax.
pub enum TargetRule {
    /// `<prefix><id>` names `kind` explicitly. An empty id yields no target.
    Prefix { prefix: &'static str, kind: TargetKind },
    /// The whole input matches `pattern`; capture group 1 is the id.
    Pattern {
        pattern: &'static LazyLock<Regex>,
        kind: TargetKind,
    },
    /// `<sigil><id>`. The sigil signals intent, so an id failing `id_pattern`
    /// is an error rather than a fallback.
    Sigil {
        sigil: char,
        kind: TargetKind,
        id_pattern: &'static LazyLock<Regex>,
        error: &'static str,
    },
}

enum Step {
    Skip,
    Done(Option<MessagingTarget>),
}

impl TargetRule {
    fn apply(&self, input: &str, raw: &str) -> Result<Step> {
        match self {
            Self::Prefix { prefix, kind } => match input.strip_prefix(*prefix) {
                Some(id) => {
                    let id = id.trim();
                    Ok(Step::Done(
                        (!id.is_empty()).then(|| build_messaging_target(*kind, id, raw)),
                    ))
                },
                None => Ok(Step::Skip),
            },
            Self::Pattern { pattern, kind } => Ok(pattern
                .captures(input)
                .and_then(|caps| caps.get(1))
                .map_or(Step::Skip, |id| {
                    Step::Done(Some(build_messaging_target(*kind, id.as_str(), raw)))
                })),
            Self::Sigil {
                sigil,
                kind,
                id_pattern,
                error,
            } => match input.strip_prefix(*sigil) {
                Some(candidate) => {
                    let id = ensure_target_id(candidate.trim(), id_pattern, error)?;
                    Ok(Step::Done(Some(build_messaging_target(*kind, id, raw))))
                },
                None => Ok(Step::Skip),
            },
        }
    }
}

/// A platform's complete address syntax.
pub struct TargetGrammar {
    pub platform: &'static str,
    /// Channel prefixes stripped (case-insensitively, repeatedly) first.
    pub channel_prefixes: &'static [&'static str],
    /// Kind implied by a stripped channel prefix. `None` continues with the
    /// rules on the stripped remainder.
    pub prefixed_kind: Option<TargetKind>,
    pub rules: &'static [TargetRule],
    pub default_kind: TargetKind,
}

impl TargetGrammar {
    /// Parse `raw`. Blank input yields `Ok(None)`; only sigil misuse is an
    /// error.
    pub fn parse(&self, raw: &str, options: &ParseOptions) -> Result<Option<MessagingTarget>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let input = strip_channel_prefixes(raw, self.channel_prefixes);
        if input.len() != raw.len()
            && let Some(kind) = self.prefixed_kind
        {
            return Ok((!input.is_empty()).then(|| build_messaging_target(kind, input, raw)));
        }
        if input.is_empty() {
            return Ok(None);
        }

        for rule in self.rules {
            if let Step::Done(target) = rule.apply(input, raw)? {
                return Ok(target);
            }
        }

        let kind = options.default_kind.unwrap_or(self.default_kind);
        Ok(Some(build_messaging_target(kind, input, raw)))
    }
}

static GENERIC_RULES: &[TargetRule] = &[
    TargetRule::Prefix {
        prefix: "user:",
        kind: TargetKind::User,
    },
    TargetRule::Prefix {
        prefix: "channel:",
        kind: TargetKind::Channel,
    },
];

/// Fallback for platforms without a dedicated grammar: explicit `user:` or
/// `channel:` prefixes, otherwise a channel.
pub static GENERIC: TargetGrammar = TargetGrammar {
    platform: "Target",
    channel_prefixes: &[],
    prefixed_kind: None,
    rules: GENERIC_RULES,
    default_kind: TargetKind::Channel,
};

#[allow(clippy::expect_used)]
pub(crate) static ALNUM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9]+$").expect("hardcoded regex"));

#[allow(clippy::expect_used)]
pub(crate) static DIGITS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("hardcoded regex"));
