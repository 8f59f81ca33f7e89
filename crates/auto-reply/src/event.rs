//! Typed inbound events as delivered by channel adapters.
//!
//! Adapters translate platform payloads into these structs; everything
//! downstream (conversation keys, debounce decisions, session keys) is
//! derived here so every platform batches the same way.

use {
    serde::{Deserialize, Serialize},
    switchboard_channels::{is_whatsapp_group_jid, normalize_whatsapp_target},
    switchboard_common::{ChannelType, ChatType},
    switchboard_config::SwitchboardConfig,
    switchboard_sessions::PeerScope,
};

use crate::{command::has_control_command, inbound_batch::InboundEntry};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordInbound {
    pub account_id: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Absent for DMs.
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mentioned: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackInbound {
    pub team_id: String,
    #[serde(default)]
    pub channel: Option<String>,
    /// `im`, `mpim`, `channel` or `group`, as reported by the Events API.
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub mentioned: bool,
    #[serde(default)]
    pub files: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramInbound {
    pub account_id: String,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub from_id: Option<i64>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub message_thread_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    /// Media captions stand in for text.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub mentioned: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppInbound {
    pub account_id: String,
    #[serde(default)]
    pub chat_jid: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub mentioned: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum InboundEvent {
    Discord(DiscordInbound),
    Slack(SlackInbound),
    Telegram(TelegramInbound),
    WhatsApp(WhatsAppInbound),
}

/// Per-platform accessors behind [`InboundEvent`].
trait PlatformEvent: InboundEntry {
    fn account(&self) -> &str;
    fn chat(&self) -> Option<String>;
    fn author(&self) -> Option<String>;
    fn has_attachments(&self) -> bool;
    fn peer(&self) -> Option<PeerScope>;

    /// Thread or forum topic within the chat. Each thread is its own
    /// conversation.
    fn thread(&self) -> Option<String> {
        None
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl InboundEntry for DiscordInbound {
    fn text(&self) -> Option<&str> {
        Some(&self.content)
    }

    fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    fn was_mentioned(&self) -> bool {
        self.mentioned
    }
}

impl PlatformEvent for DiscordInbound {
    fn account(&self) -> &str {
        &self.account_id
    }

    fn chat(&self) -> Option<String> {
        non_empty(self.channel_id.as_ref())
    }

    fn author(&self) -> Option<String> {
        non_empty(self.author_id.as_ref())
    }

    fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    fn peer(&self) -> Option<PeerScope> {
        if self.guild_id.is_none() {
            let author = self.author()?;
            return Some(PeerScope::new("discord", ChatType::Direct, author));
        }
        Some(PeerScope::new("discord", ChatType::Channel, self.chat()?))
    }
}

impl InboundEntry for SlackInbound {
    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }

    fn message_id(&self) -> Option<&str> {
        self.ts.as_deref()
    }

    fn was_mentioned(&self) -> bool {
        self.mentioned
    }
}

impl PlatformEvent for SlackInbound {
    fn account(&self) -> &str {
        &self.team_id
    }

    fn chat(&self) -> Option<String> {
        non_empty(self.channel.as_ref())
    }

    fn author(&self) -> Option<String> {
        non_empty(self.user.as_ref())
    }

    fn has_attachments(&self) -> bool {
        !self.files.is_empty()
    }

    fn thread(&self) -> Option<String> {
        non_empty(self.thread_ts.as_ref())
    }

    fn peer(&self) -> Option<PeerScope> {
        let peer = match self.channel_type.as_deref() {
            Some("im") => PeerScope::new("slack", ChatType::Direct, self.author()?),
            Some("mpim") => PeerScope::new("slack", ChatType::Group, self.chat()?),
            _ => PeerScope::new("slack", ChatType::Channel, self.chat()?),
        };
        Some(match self.thread() {
            Some(thread) => peer.with_thread(thread),
            None => peer,
        })
    }
}

impl InboundEntry for TelegramInbound {
    fn text(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    fn was_mentioned(&self) -> bool {
        self.mentioned
    }
}

impl PlatformEvent for TelegramInbound {
    fn account(&self) -> &str {
        &self.account_id
    }

    fn chat(&self) -> Option<String> {
        self.chat_id.map(|id| id.to_string())
    }

    fn author(&self) -> Option<String> {
        self.from_id.map(|id| id.to_string())
    }

    fn thread(&self) -> Option<String> {
        self.message_thread_id.map(|id| id.to_string())
    }

    fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    fn peer(&self) -> Option<PeerScope> {
        let chat_id = self.chat_id?;
        let chat_type = if chat_id < 0 {
            ChatType::Group
        } else {
            ChatType::Direct
        };
        let peer = PeerScope::new("telegram", chat_type, chat_id.to_string());
        Some(match self.thread() {
            Some(thread) => peer.with_thread(thread),
            None => peer,
        })
    }
}

impl InboundEntry for WhatsAppInbound {
    fn text(&self) -> Option<&str> {
        Some(&self.body)
    }

    fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    fn was_mentioned(&self) -> bool {
        self.mentioned
    }
}

impl PlatformEvent for WhatsAppInbound {
    fn account(&self) -> &str {
        &self.account_id
    }

    fn chat(&self) -> Option<String> {
        non_empty(self.chat_jid.as_ref())
    }

    fn author(&self) -> Option<String> {
        non_empty(self.sender.as_ref())
    }

    fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    fn peer(&self) -> Option<PeerScope> {
        let chat = self.chat();
        if let Some(jid) = chat.as_deref()
            && is_whatsapp_group_jid(jid)
        {
            return Some(PeerScope::new("whatsapp", ChatType::Group, jid));
        }
        let person = self.author().or(chat)?;
        let target = normalize_whatsapp_target(&person)?;
        Some(PeerScope::new("whatsapp", target.chat_type, target.id))
    }
}

impl InboundEvent {
    fn platform(&self) -> &dyn PlatformEvent {
        match self {
            Self::Discord(event) => event,
            Self::Slack(event) => event,
            Self::Telegram(event) => event,
            Self::WhatsApp(event) => event,
        }
    }

    pub fn channel(&self) -> ChannelType {
        match self {
            Self::Discord(_) => ChannelType::Discord,
            Self::Slack(_) => ChannelType::Slack,
            Self::Telegram(_) => ChannelType::Telegram,
            Self::WhatsApp(_) => ChannelType::WhatsApp,
        }
    }

    /// `<platform>:<account>:<chat>:<author>[:thread:<threadId>]`, or `None`
    /// when the chat or author is unknown. Threads and forum topics split the
    /// key the same way they split the session key.
    pub fn conversation_key(&self) -> Option<String> {
        let event = self.platform();
        let (chat, author) = (event.chat()?, event.author()?);
        let key = format!("{}:{}:{chat}:{author}", self.channel(), event.account());
        Some(match event.thread() {
            Some(thread) => format!("{key}:thread:{thread}"),
            None => key,
        })
    }

    pub fn has_attachments(&self) -> bool {
        self.platform().has_attachments()
    }

    /// The platform conversation this event belongs to, for session keys.
    pub fn peer(&self) -> Option<PeerScope> {
        self.platform().peer()
    }

    /// Attachments, blank text, and control commands skip the debounce
    /// window.
    pub fn default_should_debounce(&self, config: &SwitchboardConfig) -> bool {
        if self.has_attachments() {
            return false;
        }
        let text = self.text().unwrap_or_default();
        !text.trim().is_empty() && !has_control_command(text, config)
    }
}

impl InboundEntry for InboundEvent {
    fn text(&self) -> Option<&str> {
        self.platform().text()
    }

    fn message_id(&self) -> Option<&str> {
        self.platform().message_id()
    }

    fn was_mentioned(&self) -> bool {
        self.platform().was_mentioned()
    }
}
