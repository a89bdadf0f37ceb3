//! Wire types and the session-client contract the runtime drives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
/// Failures surfaced by the session transport.
pub enum SessionError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("api rejected request: {description}")]
    Api { description: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireChat {
    pub id: i64,
}

/// One message as the Bot API delivers it; only the fields the dispatcher
/// reads are modeled.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireMessage {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<WireUser>,
    pub chat: WireChat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<WireMessage>>,
}

/// One long-poll update. New, edited, and channel messages arrive in
/// distinct slots but are handled through a single path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub edited_message: Option<WireMessage>,
    #[serde(default)]
    pub channel_post: Option<WireMessage>,
    #[serde(default)]
    pub edited_channel_post: Option<WireMessage>,
}

impl RawUpdate {
    /// Returns the message payload regardless of which update slot carried
    /// it, or `None` for payload-less updates.
    pub fn message_payload(&self) -> Option<&WireMessage> {
        self.message
            .as_ref()
            .or(self.edited_message.as_ref())
            .or(self.channel_post.as_ref())
            .or(self.edited_channel_post.as_ref())
    }
}

/// The authenticated account behind the session.
#[derive(Debug, Clone)]
pub struct SelfInfo {
    pub id: i64,
    pub username: Option<String>,
}

#[async_trait]
/// Trait contract for the session transport.
///
/// The runtime owns the event loop and calls `poll_updates` repeatedly;
/// everything else is a single request-response exchange.
pub trait SessionClient: Send + Sync {
    /// Validates the credential and brings the session up.
    async fn start(&self) -> Result<(), SessionError>;

    /// Resolves the bot's own account.
    async fn get_self(&self) -> Result<SelfInfo, SessionError>;

    /// Long-polls for the next batch of updates at or after `offset`.
    async fn poll_updates(
        &self,
        offset: i64,
        timeout_seconds: u64,
    ) -> Result<Vec<RawUpdate>, SessionError>;

    /// Sends a new message to `peer`.
    async fn send_message(&self, peer: i64, text: &str) -> Result<(), SessionError>;

    /// Edits an existing message in place; `html` enables rich-text parsing.
    async fn edit_message(
        &self,
        peer: i64,
        message_id: i64,
        text: &str,
        html: bool,
    ) -> Result<(), SessionError>;

    /// Terminates the session credential permanently.
    async fn log_out(&self) -> Result<(), SessionError>;
}

#[cfg(test)]
mod tests {
    use super::RawUpdate;

    fn update(slot: &str) -> RawUpdate {
        serde_json::from_value(serde_json::json!({
            "update_id": 7,
            slot: {
                "message_id": 3,
                "chat": {"id": 55},
                "text": "hello",
            },
        }))
        .expect("update")
    }

    #[test]
    fn unit_message_payload_reads_every_update_slot() {
        for slot in [
            "message",
            "edited_message",
            "channel_post",
            "edited_channel_post",
        ] {
            let payload = update(slot);
            let message = payload.message_payload().expect("payload");
            assert_eq!(message.message_id, 3);
            assert_eq!(message.chat.id, 55);
        }
    }

    #[test]
    fn unit_message_payload_empty_update_yields_none() {
        let empty: RawUpdate =
            serde_json::from_value(serde_json::json!({"update_id": 9})).expect("update");
        assert!(empty.message_payload().is_none());
    }
}
