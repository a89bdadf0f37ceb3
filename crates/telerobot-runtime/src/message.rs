//! Normalized per-event view of one inbound update.

use telerobot_telegram::RawUpdate;

/// Flattened message metadata the dispatcher classifies on. Derived per
/// event, never persisted.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub text: Option<String>,
    pub message_id: i64,
    pub from_id: i64,
    pub reply_to_id: i64,
    pub is_outward: bool,
    pub peer: i64,
}

impl InboundMessage {
    /// Normalizes new, edited, and channel messages into one shape; returns
    /// `None` for updates without a message payload.
    pub fn from_update(update: &RawUpdate, robot_id: i64) -> Option<Self> {
        let message = update.message_payload()?;
        let from_id = message.from.as_ref().map(|user| user.id).unwrap_or(0);
        let reply_to_id = message
            .reply_to_message
            .as_deref()
            .and_then(|replied| replied.from.as_ref())
            .map(|user| user.id)
            .unwrap_or(0);
        Some(Self {
            text: message.text.clone(),
            message_id: message.message_id,
            from_id,
            reply_to_id,
            is_outward: from_id == robot_id,
            peer: message.chat.id,
        })
    }

    fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.is_empty())
    }

    /// True when the bot itself authored the message and it carries text.
    pub fn by_robot(&self, robot_id: i64) -> bool {
        self.from_id == robot_id && self.has_text()
    }

    /// True when the message replies to one of the bot's own messages and
    /// carries text.
    pub fn to_robot(&self, robot_id: i64) -> bool {
        self.reply_to_id == robot_id && self.has_text()
    }
}
