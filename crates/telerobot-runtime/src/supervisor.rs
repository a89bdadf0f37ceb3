//! Bounded-retry supervision of the session serve loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use telerobot_telegram::SessionClient;

use crate::identity::ReportPeerSlot;
use crate::session::ServeOutcome;

const BACKOFF_SHIFT_CAP: u32 = 6;

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Restart budget beyond the initial attempt.
    pub max_restarts: u32,
    pub backoff_base_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_restarts: 1,
            backoff_base_ms: 2_000,
        }
    }
}

/// Monotonic restart accounting for one process lifetime; never reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartState {
    attempts: u32,
    max_attempts: u32,
}

impl RestartState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True while another restart fits the budget.
    pub fn can_restart(&self) -> bool {
        self.attempts < self.max_attempts
    }

    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1).min(self.max_attempts);
    }
}

/// How supervision ended; the binary maps this onto its exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorOutcome {
    CleanShutdown,
    RetriesExhausted { attempts: u32 },
}

/// Best-effort fatal-failure notifications to the report peers.
///
/// Send failures are logged and swallowed; a failed report never escalates
/// and is never retried.
pub struct FailureReporter {
    client: Arc<dyn SessionClient>,
    peers: ReportPeerSlot,
}

impl FailureReporter {
    pub fn new(client: Arc<dyn SessionClient>, peers: ReportPeerSlot) -> Self {
        Self { client, peers }
    }

    pub async fn report(&self, text: &str) {
        for peer in self.peers.snapshot() {
            if let Err(error) = self.client.send_message(peer, text).await {
                tracing::warn!(peer, error = %error, "failed to deliver failure report");
            }
        }
    }
}

pub struct Supervisor {
    config: SupervisorConfig,
    reporter: FailureReporter,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig, reporter: FailureReporter) -> Self {
        Self { config, reporter }
    }

    /// Drives `start_and_serve` under the capped-retry policy.
    ///
    /// A clean shutdown ends supervision immediately. A restart signal
    /// consumes one attempt and retries at once. A fatal error is logged,
    /// reported to the peers, and retried after exponential backoff until
    /// the budget runs out. At most `max_restarts + 1` invocations happen.
    pub async fn run<F, Fut>(&self, mut start_and_serve: F) -> SupervisorOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<ServeOutcome>>,
    {
        let mut state = RestartState::new(self.config.max_restarts);
        loop {
            match start_and_serve().await {
                Ok(ServeOutcome::Shutdown) => return SupervisorOutcome::CleanShutdown,
                Ok(ServeOutcome::Restart) => {
                    if !state.can_restart() {
                        tracing::warn!(
                            attempts = state.attempts(),
                            "restart requested but the restart budget is exhausted"
                        );
                        return SupervisorOutcome::RetriesExhausted {
                            attempts: state.attempts(),
                        };
                    }
                    state.record_attempt();
                    tracing::info!(attempt = state.attempts(), "restarting session");
                }
                Err(error) => {
                    tracing::error!("session terminated with a fatal error: {error:#}");
                    self.reporter.report(&format!("Surfaced: {error:#}")).await;
                    if !state.can_restart() {
                        return SupervisorOutcome::RetriesExhausted {
                            attempts: state.attempts(),
                        };
                    }
                    state.record_attempt();
                    let delay = restart_backoff(self.config.backoff_base_ms, state.attempts());
                    tracing::info!(
                        attempt = state.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "retrying session after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn restart_backoff(base_ms: u64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(BACKOFF_SHIFT_CAP);
    Duration::from_millis(base_ms.max(1).saturating_mul(1_u64 << exponent))
}
