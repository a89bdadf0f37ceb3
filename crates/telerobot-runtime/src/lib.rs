//! Supervision and dispatch layer for the telerobot session.
//!
//! The session runtime owns the startup transition and the long-poll serve
//! loop, the dispatcher classifies and routes self-administration commands,
//! the periodic runner drives a self-rescheduling background task, and the
//! supervisor wraps the whole thing in a capped-retry policy with
//! best-effort failure reporting.

mod audit;
mod command;
mod dispatcher;
mod identity;
mod message;
mod periodic;
mod session;
mod supervisor;

pub use audit::AuditLog;
pub use command::{Command, LifecycleSignal, STOP_SENTINEL};
pub use dispatcher::Dispatcher;
pub use identity::{build_report_peers, BotIdentity, ReportPeerSlot};
pub use message::InboundMessage;
pub use periodic::{spawn_periodic_task, PeriodicTaskHandle};
pub use session::{clock_task, RuntimeConfig, ServeOutcome, SessionRuntime};
pub use supervisor::{
    FailureReporter, RestartState, Supervisor, SupervisorConfig, SupervisorOutcome,
};

#[cfg(test)]
mod test_support;
