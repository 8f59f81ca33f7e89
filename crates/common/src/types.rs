use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// The shape of a conversation on a chat platform.
///
/// `dm` is accepted as an alias for [`ChatType::Direct`] when parsing; the
/// canonical spelling written into session keys is always `direct`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    #[serde(alias = "dm")]
    Direct,
    Group,
    Channel,
    #[default]
    Unknown,
}

impl ChatType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Group => "group",
            Self::Channel => "channel",
            Self::Unknown => "unknown",
        }
    }

    /// One-to-one conversations get DM-specific history limits.
    pub fn is_direct(self) -> bool {
        matches!(self, Self::Direct)
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" | "dm" => Ok(Self::Direct),
            "group" => Ok(Self::Group),
            "channel" => Ok(Self::Channel),
            "unknown" => Ok(Self::Unknown),
            _ => Err(UnknownVariant {
                kind: "chat type",
                value: s.to_string(),
            }),
        }
    }
}

/// Chat platforms with dedicated target parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Discord,
    Slack,
    Telegram,
    #[serde(alias = "wa")]
    WhatsApp,
}

impl ChannelType {
    pub const ALL: [Self; 4] = [Self::Discord, Self::Slack, Self::Telegram, Self::WhatsApp];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Slack => "slack",
            Self::Telegram => "telegram",
            Self::WhatsApp => "whatsapp",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discord" => Ok(Self::Discord),
            "slack" => Ok(Self::Slack),
            "telegram" | "tg" => Ok(Self::Telegram),
            "whatsapp" | "wa" => Ok(Self::WhatsApp),
            _ => Err(UnknownVariant {
                kind: "channel type",
                value: s.to_string(),
            }),
        }
    }
}
