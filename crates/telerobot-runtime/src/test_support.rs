//! Scripted session client and update builders shared by the runtime tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use telerobot_telegram::{RawUpdate, SelfInfo, SessionClient, SessionError};

/// Observable side effects the mock records, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClientCall {
    Send { peer: i64, text: String },
    Edit {
        peer: i64,
        message_id: i64,
        text: String,
        html: bool,
    },
    LogOut,
}

pub(crate) struct RecordingClient {
    self_id: i64,
    fail_sends: bool,
    fail_edits: bool,
    calls: Mutex<Vec<ClientCall>>,
    updates: Mutex<VecDeque<Vec<RawUpdate>>>,
}

impl RecordingClient {
    pub(crate) fn new(self_id: i64) -> Self {
        Self {
            self_id,
            fail_sends: false,
            fail_edits: false,
            calls: Mutex::new(Vec::new()),
            updates: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn with_failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub(crate) fn with_failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    /// Queues one poll batch; each `poll_updates` call consumes one batch
    /// and an empty queue fails the poll.
    pub(crate) fn push_updates(&self, batch: Vec<RawUpdate>) {
        self.updates.lock().expect("updates queue").push_back(batch);
    }

    pub(crate) fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().expect("call log").clone()
    }

    fn record(&self, call: ClientCall) {
        self.calls.lock().expect("call log").push(call);
    }
}

#[async_trait]
impl SessionClient for RecordingClient {
    async fn start(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn get_self(&self) -> Result<SelfInfo, SessionError> {
        Ok(SelfInfo {
            id: self.self_id,
            username: Some("telerobot_bot".to_string()),
        })
    }

    async fn poll_updates(
        &self,
        _offset: i64,
        _timeout_seconds: u64,
    ) -> Result<Vec<RawUpdate>, SessionError> {
        self.updates
            .lock()
            .expect("updates queue")
            .pop_front()
            .ok_or_else(|| SessionError::InvalidResponse("scripted update queue is empty".into()))
    }

    async fn send_message(&self, peer: i64, text: &str) -> Result<(), SessionError> {
        if self.fail_sends {
            return Err(SessionError::Api {
                description: "scripted send failure".to_string(),
            });
        }
        self.record(ClientCall::Send {
            peer,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        peer: i64,
        message_id: i64,
        text: &str,
        html: bool,
    ) -> Result<(), SessionError> {
        if self.fail_edits {
            return Err(SessionError::Api {
                description: "scripted edit failure".to_string(),
            });
        }
        self.record(ClientCall::Edit {
            peer,
            message_id,
            text: text.to_string(),
            html,
        });
        Ok(())
    }

    async fn log_out(&self) -> Result<(), SessionError> {
        self.record(ClientCall::LogOut);
        Ok(())
    }
}

pub(crate) fn update_from_json(value: serde_json::Value) -> RawUpdate {
    serde_json::from_value(value).expect("well-formed update fixture")
}

/// A text message the bot sent to its own saved-messages chat.
pub(crate) fn self_update(update_id: i64, robot_id: i64, text: &str) -> RawUpdate {
    update_from_json(serde_json::json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id * 100,
            "from": {"id": robot_id},
            "chat": {"id": robot_id},
            "text": text,
        },
    }))
}

/// A text message from some other account in its own chat.
pub(crate) fn foreign_update(update_id: i64, sender_id: i64, text: &str) -> RawUpdate {
    update_from_json(serde_json::json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id * 100,
            "from": {"id": sender_id},
            "chat": {"id": sender_id},
            "text": text,
        },
    }))
}
