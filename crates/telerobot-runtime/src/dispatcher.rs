//! Per-event classification, authorization, and command dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use telerobot_core::{
    current_unix_timestamp, format_byte_size, format_uptime, resident_memory_bytes,
};
use telerobot_telegram::{RawUpdate, SessionClient};

use crate::audit::AuditLog;
use crate::command::{
    help_text, parse_command_text, Command, LifecycleSignal, LOGOUT_REPLY, RESTART_REPLY,
    STATUS_REPLY, STOP_SENTINEL,
};
use crate::identity::BotIdentity;
use crate::message::InboundMessage;

/// Routes inbound events. Stateless across events; the identity shared
/// context is resolved before the first dispatch and never changes.
pub struct Dispatcher {
    identity: Arc<BotIdentity>,
    client: Arc<dyn SessionClient>,
    audit: Option<AuditLog>,
}

impl Dispatcher {
    pub fn new(
        identity: Arc<BotIdentity>,
        client: Arc<dyn SessionClient>,
        audit: Option<AuditLog>,
    ) -> Self {
        Self {
            identity,
            client,
            audit,
        }
    }

    /// Classifies one inbound update and routes any recognized command.
    ///
    /// Only messages authored by the bot's own account are command-eligible;
    /// everything else is at most recorded in the audit trail. Errors are
    /// per-event: the serve loop logs them and moves on.
    pub async fn dispatch(&self, update: &RawUpdate) -> Result<Option<LifecycleSignal>> {
        let robot_id = self.identity.robot_id;
        let Some(message) = InboundMessage::from_update(update, robot_id) else {
            return Ok(None);
        };

        let by_robot = message.by_robot(robot_id);
        let to_robot = message.to_robot(robot_id);
        if by_robot || to_robot {
            self.record_raw(update);
        }

        let mut signal = None;
        if by_robot {
            if let Some(command) = message.text.as_deref().and_then(parse_command_text) {
                signal = self.execute(command, &message).await?;
            }

            // Second half of the stop protocol: the stop handler's own
            // announcement, observed as a fresh self-event, carries the
            // actual shutdown.
            if message.text.as_deref() == Some(STOP_SENTINEL) {
                signal = Some(LifecycleSignal::Stop);
            }
        }

        Ok(signal)
    }

    async fn execute(
        &self,
        command: Command,
        message: &InboundMessage,
    ) -> Result<Option<LifecycleSignal>> {
        match command {
            Command::Help => {
                self.edit_reply(message, &help_text(), true).await?;
                Ok(None)
            }
            Command::Status => {
                self.edit_reply(message, STATUS_REPLY, false).await?;
                Ok(None)
            }
            Command::Uptime => {
                let age = self.identity.uptime_seconds(current_unix_timestamp());
                let reply = format!("Robot's uptime is: {}.", format_uptime(age));
                self.edit_reply(message, &reply, false).await?;
                Ok(None)
            }
            Command::Memory => {
                let usage = resident_memory_bytes().unwrap_or(0);
                let reply = format!("Robot's memory usage is: {}.", format_byte_size(usage));
                self.edit_reply(message, &reply, false).await?;
                Ok(None)
            }
            Command::Restart => {
                self.edit_reply(message, RESTART_REPLY, false).await?;
                tracing::info!("robot restart requested by the owner");
                Ok(Some(LifecycleSignal::Restart))
            }
            Command::Logout => {
                self.edit_reply(message, LOGOUT_REPLY, false).await?;
                tracing::info!("robot logout requested by the owner");
                Ok(Some(LifecycleSignal::Logout))
            }
            Command::Stop => {
                self.edit_reply(message, STOP_SENTINEL, false).await?;
                Ok(None)
            }
        }
    }

    async fn edit_reply(&self, message: &InboundMessage, text: &str, html: bool) -> Result<()> {
        self.client
            .edit_message(message.peer, message.message_id, text, html)
            .await
            .with_context(|| format!("failed to edit reply to message {}", message.message_id))
    }

    /// Audit trail of the bot's own traffic and replies to it, emitted at
    /// error severity. Best-effort.
    fn record_raw(&self, update: &RawUpdate) {
        match serde_json::to_string(update) {
            Ok(raw) => tracing::error!(target: "telerobot::audit", "{raw}"),
            Err(error) => {
                tracing::warn!("failed to serialize update for audit: {error}")
            }
        }
        if let Some(audit) = &self.audit {
            if let Err(error) = audit.append(update) {
                tracing::warn!("failed to append audit entry: {error:#}");
            }
        }
    }
}
