//! Session runtime: startup sequencing and the long-poll serve loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use telerobot_telegram::SessionClient;

use crate::audit::AuditLog;
use crate::command::{LifecycleSignal, STARTUP_NOTICE};
use crate::dispatcher::Dispatcher;
use crate::identity::{build_report_peers, BotIdentity, ReportPeerSlot};
use crate::periodic::spawn_periodic_task;

/// How one serve pass ended; the supervisor decides what happens next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    Shutdown,
    Restart,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub owner_id: Option<i64>,
    pub report_peers: Vec<String>,
    pub poll_timeout_seconds: u64,
    pub periodic_interval_seconds: u64,
    pub audit_log_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            owner_id: None,
            report_peers: Vec::new(),
            poll_timeout_seconds: 25,
            periodic_interval_seconds: 120,
            audit_log_path: None,
        }
    }
}

/// Owns one session over the client: the startup transition, the event
/// loop, and the periodic task running beside it.
pub struct SessionRuntime {
    config: RuntimeConfig,
    client: Arc<dyn SessionClient>,
    report_peers: ReportPeerSlot,
}

impl SessionRuntime {
    pub fn new(
        config: RuntimeConfig,
        client: Arc<dyn SessionClient>,
        report_peers: ReportPeerSlot,
    ) -> Self {
        Self {
            config,
            client,
            report_peers,
        }
    }

    /// One full session pass.
    ///
    /// The startup sequence is strictly ordered: bring the session up,
    /// resolve the bot's own identity, publish the report peers, announce
    /// the start, then spawn the periodic task and serve updates until a
    /// lifecycle signal or a fatal transport error.
    pub async fn start_and_serve(&self) -> Result<ServeOutcome> {
        self.client
            .start()
            .await
            .context("failed to start session")?;
        let who = self
            .client
            .get_self()
            .await
            .context("failed to resolve own identity")?;
        let identity = Arc::new(BotIdentity::resolve(who.id, self.config.owner_id));
        self.report_peers.publish(build_report_peers(
            &self.config.report_peers,
            identity.robot_id,
            identity.owner_id,
        ));

        self.client
            .send_message(identity.robot_id, STARTUP_NOTICE)
            .await
            .context("failed to send startup notice")?;
        tracing::info!(robot_id = identity.robot_id, "session started");

        let dispatcher = Dispatcher::new(
            identity,
            self.client.clone(),
            self.config.audit_log_path.clone().map(AuditLog::new),
        );

        let interval = self.config.periodic_interval_seconds;
        let mut periodic = spawn_periodic_task(move || clock_task(interval))?;
        let outcome = self.serve_updates(&dispatcher).await;
        periodic.shutdown().await;
        outcome
    }

    async fn serve_updates(&self, dispatcher: &Dispatcher) -> Result<ServeOutcome> {
        let mut offset = 0_i64;
        loop {
            let updates = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupt received; shutting down");
                    return Ok(ServeOutcome::Shutdown);
                }
                polled = self.client.poll_updates(offset, self.config.poll_timeout_seconds) => {
                    polled.context("failed to poll session updates")?
                }
            };

            for update in &updates {
                offset = offset.max(update.update_id.saturating_add(1));
                match dispatcher.dispatch(update).await {
                    Ok(Some(LifecycleSignal::Restart)) => return Ok(ServeOutcome::Restart),
                    Ok(Some(LifecycleSignal::Logout)) => {
                        self.client
                            .log_out()
                            .await
                            .context("failed to log out session")?;
                        tracing::info!("session credential terminated");
                        return Ok(ServeOutcome::Shutdown);
                    }
                    Ok(Some(LifecycleSignal::Stop)) => return Ok(ServeOutcome::Shutdown),
                    Ok(None) => {}
                    Err(error) => {
                        tracing::warn!(
                            update_id = update.update_id,
                            "event handling failed: {error:#}"
                        );
                    }
                }
            }
        }
    }
}

/// Default periodic task: logs a wall-clock line, then asks to run again.
pub async fn clock_task(interval_seconds: u64) -> Result<u64> {
    tracing::info!("Time is {}!", chrono::Local::now().format("%H:%M:%S"));
    Ok(interval_seconds)
}
