use serde::Deserialize;

/// Top-level webhook payload from the Events API.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub challenge: Option<String>,
    pub event: Option<MessageEvent>,
}

/// Closed classification of the envelope type, fixed at the boundary so a
/// typo'd event name can never fall through silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    UrlVerification,
    EventCallback,
    #[serde(other)]
    Other,
}

/// An inbound message-ish event. Immutable once received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub text: Option<String>,
    pub channel: Option<String>,
    pub user: Option<String>,
    pub thread_ts: Option<String>,
    pub bot_id: Option<String>,
    pub subtype: Option<String>,
    pub event_ts: Option<String>,
    pub ts: Option<String>,
    pub channel_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The bot's identity is explicitly addressed.
    Mention,
    /// 1:1 conversation with the bot.
    DirectMessage,
    /// A plain reply inside some thread.
    ThreadReply,
    Other,
}

impl MessageEvent {
    pub fn classify(&self) -> EventKind {
        if self.kind == "app_mention" {
            return EventKind::Mention;
        }
        if self.channel_type.as_deref() == Some("im") {
            return EventKind::DirectMessage;
        }
        if self.thread_ts.is_some() {
            return EventKind::ThreadReply;
        }
        EventKind::Other
    }

    pub fn is_mention(&self) -> bool {
        self.classify() == EventKind::Mention
    }

    /// Stable dedup identifier. The server-assigned `event_ts` is
    /// preferred: the user-facing `ts` can collide across distinct
    /// logical events in rare races.
    pub fn dedup_id(&self) -> Option<&str> {
        self.event_ts.as_deref().or(self.ts.as_deref())
    }

    /// Root timestamp of the conversation this event belongs to — the
    /// enclosing thread, or the message itself when unthreaded.
    pub fn conversation_root(&self) -> Option<&str> {
        self.thread_ts.as_deref().or(self.ts.as_deref())
    }
}
