use std::{fmt, str::FromStr};

use {
    serde::{Deserialize, Serialize},
    switchboard_common::ChatType,
};

use crate::{Error, Result};

/// Literal first segment of every canonical key.
pub const AGENT_PREFIX: &str = "agent:";
/// Scope of an agent's primary conversation.
pub const MAIN_SCOPE: &str = "main";
pub(crate) const SUBAGENT_PREFIX: &str = "subagent:";
pub(crate) const THREAD_MARKER: &str = ":thread:";

/// A platform conversation: `<channel>:<chatType>:<peerId>[:thread:<threadId>]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerScope {
    /// Platform name, lowercase (`telegram`, `slack`, `unknown` for migrated keys).
    pub channel: String,
    pub chat_type: ChatType,
    /// Platform conversation id, verbatim. May itself contain `:`.
    pub peer_id: String,
    pub thread_id: Option<String>,
}

impl PeerScope {
    pub fn new(channel: impl Into<String>, chat_type: ChatType, peer_id: impl Into<String>) -> Self {
        Self {
            channel: channel.into().to_ascii_lowercase(),
            chat_type,
            peer_id: peer_id.into(),
            thread_id: None,
        }
    }

    #[must_use]
    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }
}

/// Everything after `agent:<agentId>:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionScope {
    Main,
    Subagent(String),
    Peer(PeerScope),
    /// A well-formed key whose scope matches none of the shapes above, e.g.
    /// the output of best-effort legacy wrapping.
    Other(String),
}

impl fmt::Display for SessionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str(MAIN_SCOPE),
            Self::Subagent(name) => write!(f, "{SUBAGENT_PREFIX}{name}"),
            Self::Peer(peer) => {
                write!(f, "{}:{}:{}", peer.channel, peer.chat_type, peer.peer_id)?;
                if let Some(thread) = &peer.thread_id {
                    write!(f, "{THREAD_MARKER}{thread}")?;
                }
                Ok(())
            },
            Self::Other(rest) => f.write_str(rest),
        }
    }
}

impl SessionScope {
    /// Decompose a scope string. Never fails: unrecognised shapes become
    /// [`SessionScope::Other`].
    pub fn parse(scope: &str) -> Self {
        if scope == MAIN_SCOPE {
            return Self::Main;
        }
        if let Some(name) = scope.strip_prefix(SUBAGENT_PREFIX)
            && !name.is_empty()
        {
            return Self::Subagent(name.to_string());
        }
        parse_peer_scope(scope).map_or_else(|| Self::Other(scope.to_string()), Self::Peer)
    }

    pub fn as_peer(&self) -> Option<&PeerScope> {
        match self {
            Self::Peer(peer) => Some(peer),
            _ => None,
        }
    }
}

/// Split a trailing `:thread:<id>` off a string. The thread id must be
/// non-empty and the remainder must be non-empty for the split to apply.
pub fn split_thread_suffix(value: &str) -> (&str, Option<&str>) {
    match value.rfind(THREAD_MARKER) {
        Some(idx) if idx > 0 && idx + THREAD_MARKER.len() < value.len() => {
            (&value[..idx], Some(&value[idx + THREAD_MARKER.len()..]))
        },
        _ => (value, None),
    }
}

fn parse_peer_scope(scope: &str) -> Option<PeerScope> {
    let (base, thread) = split_thread_suffix(scope);
    let mut parts = base.splitn(3, ':');
    let channel = parts.next().filter(|s| !s.is_empty())?;
    let chat_type = parts.next()?.parse::<ChatType>().ok()?;
    let peer_id = parts.next().filter(|s| !s.is_empty())?;
    Some(PeerScope {
        channel: channel.to_ascii_lowercase(),
        chat_type,
        peer_id: peer_id.to_string(),
        thread_id: thread.map(str::to_string),
    })
}

/// Build `agent:<agentId>:<scope>`.
pub fn build_session_key(agent_id: &str, scope: &SessionScope) -> String {
    format!("{AGENT_PREFIX}{agent_id}:{scope}")
}

/// Build the key for a platform conversation.
pub fn build_peer_session_key(
    agent_id: &str,
    channel: &str,
    chat_type: ChatType,
    peer_id: &str,
    thread_id: Option<&str>,
) -> String {
    let mut peer = PeerScope::new(channel, chat_type, peer_id);
    peer.thread_id = thread_id.filter(|t| !t.is_empty()).map(str::to_string);
    build_session_key(agent_id, &SessionScope::Peer(peer))
}

/// Agent ids match config case-insensitively; keys always carry the
/// lowercase form.
pub fn normalize_agent_id(agent_id: &str) -> String {
    agent_id.trim().to_lowercase()
}

/// Decompose a canonical key into its agent id and scope.
///
/// Returns `None` unless the key starts with `agent:` and has a non-empty
/// agent id followed by a non-empty scope.
pub fn parse_session_key(key: &str) -> Option<(&str, SessionScope)> {
    let rest = key.strip_prefix(AGENT_PREFIX)?;
    let (agent_id, scope) = rest.split_once(':')?;
    if agent_id.is_empty() || scope.is_empty() {
        return None;
    }
    Some((agent_id, SessionScope::parse(scope)))
}

/// A validated canonical session key.
///
/// Serialises as the plain string so it can be used directly as a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(agent_id: &str, scope: &SessionScope) -> Self {
        Self(build_session_key(agent_id, scope))
    }

    pub fn main(agent_id: &str) -> Self {
        Self::new(agent_id, &SessionScope::Main)
    }

    pub fn subagent(agent_id: &str, name: &str) -> Self {
        Self::new(agent_id, &SessionScope::Subagent(name.to_string()))
    }

    pub fn peer(agent_id: &str, peer: PeerScope) -> Self {
        Self::new(agent_id, &SessionScope::Peer(peer))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn agent_id(&self) -> &str {
        self.0[AGENT_PREFIX.len()..]
            .split(':')
            .next()
            .unwrap_or_default()
    }

    pub fn scope(&self) -> SessionScope {
        parse_session_key(&self.0).map_or(SessionScope::Main, |(_, scope)| scope)
    }
}

impl FromStr for SessionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !s.starts_with(AGENT_PREFIX) {
            return Err(Error::invalid_key(s, "missing agent: prefix"));
        }
        if parse_session_key(s).is_none() {
            return Err(Error::invalid_key(s, "expected agent:<agentId>:<scope>"));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for SessionKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.0
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(SessionScope::Main, "agent:ops:main")]
    #[case(SessionScope::Subagent("research".into()), "agent:ops:subagent:research")]
    #[case(
        SessionScope::Peer(PeerScope::new("Telegram", ChatType::Group, "-100123")),
        "agent:ops:telegram:group:-100123"
    )]
    #[case(
        SessionScope::Peer(PeerScope::new("slack", ChatType::Channel, "C42").with_thread("1700.5")),
        "agent:ops:slack:channel:C42:thread:1700.5"
    )]
    fn builds_and_parses(#[case] scope: SessionScope, #[case] expected: &str) {
        let key = build_session_key("ops", &scope);
        assert_eq!(key, expected);
        let (agent, parsed) = parse_session_key(&key).unwrap();
        assert_eq!(agent, "ops");
        assert_eq!(parsed, scope);
    }

    #[test]
    fn dm_alias_parses_as_direct() {
        let (_, scope) = parse_session_key("agent:main:telegram:dm:user456").unwrap();
        let peer = scope.as_peer().unwrap();
        assert_eq!(peer.chat_type, ChatType::Direct);
        assert_eq!(peer.peer_id, "user456");
    }

    #[test]
    fn peer_id_may_contain_colons() {
        let (_, scope) = parse_session_key("agent:main:matrix:group:!room:example.org").unwrap();
        assert_eq!(scope.as_peer().unwrap().peer_id, "!room:example.org");
    }

    #[test]
    fn thread_suffix_is_split_off_peer_id() {
        let (_, scope) =
            parse_session_key("agent:main:telegram:direct:user123:thread:999").unwrap();
        let peer = scope.as_peer().unwrap();
        assert_eq!(peer.peer_id, "user123");
        assert_eq!(peer.thread_id.as_deref(), Some("999"));
    }

    #[rstest]
    #[case("main")]
    #[case("agent:")]
    #[case("agent::main")]
    #[case("agent:ops")]
    #[case("agent:ops:")]
    #[case("")]
    fn rejects_malformed(#[case] key: &str) {
        assert!(parse_session_key(key).is_none());
        assert!(key.parse::<SessionKey>().is_err());
    }

    #[test]
    fn unrecognised_scope_is_other() {
        let (_, scope) = parse_session_key("agent:ops:cron:nightly").unwrap();
        assert_eq!(scope, SessionScope::Other("cron:nightly".into()));
    }

    #[test]
    fn session_key_accessors() {
        let key = SessionKey::peer("ops", PeerScope::new("discord", ChatType::Channel, "42"));
        assert_eq!(key.agent_id(), "ops");
        assert_eq!(key.as_str(), "agent:ops:discord:channel:42");
        assert_eq!(key.to_string(), key.as_str());
        assert!(matches!(key.scope(), SessionScope::Peer(_)));
        assert_eq!(SessionKey::main("ops").scope(), SessionScope::Main);
    }

    #[test]
    fn session_key_serde_is_plain_string() {
        let key = SessionKey::subagent("ops", "digest");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"agent:ops:subagent:digest\"");
        let back: SessionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<SessionKey>("\"group:1\"").is_err());
    }

    #[test]
    fn build_peer_session_key_ignores_empty_thread() {
        assert_eq!(
            build_peer_session_key("main", "WhatsApp", ChatType::Group, "1@g.us", Some("")),
            "agent:main:whatsapp:group:1@g.us"
        );
    }

    #[test]
    fn agent_ids_normalize_to_lowercase() {
        assert_eq!(normalize_agent_id("  Ops "), "ops");
    }

    #[test]
    fn split_thread_suffix_requires_both_sides() {
        assert_eq!(split_thread_suffix("a:thread:1"), ("a", Some("1")));
        assert_eq!(split_thread_suffix("a:thread:"), ("a:thread:", None));
        assert_eq!(split_thread_suffix(":thread:1"), (":thread:1", None));
    }
}
