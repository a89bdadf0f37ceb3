//! The `telerobot` binary: configuration, wiring, and exit status.

mod bootstrap;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use telerobot_core::LogRotationPolicy;
use telerobot_runtime::{
    FailureReporter, ReportPeerSlot, SessionRuntime, Supervisor, SupervisorConfig,
    SupervisorOutcome,
};
use telerobot_telegram::{TelegramClientConfig, TelegramSessionClient};

use crate::bootstrap::init_tracing;
use crate::config::RobotConfig;

#[derive(Debug, Parser)]
#[command(name = "telerobot", about = "Self-administering Telegram client daemon")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "telerobot.json")]
    config: PathBuf,
    /// Bot API token authenticating the session.
    #[arg(long, env = "TELEROBOT_BOT_TOKEN", hide_env_values = true)]
    bot_token: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let config = RobotConfig::load(&cli.config)?;

    if config.delete_log {
        telerobot_core::reset_log_file(&config.audit_log_path, LogRotationPolicy::from_env())
            .context("failed to reset audit log")?;
    }

    let client = Arc::new(TelegramSessionClient::new(TelegramClientConfig {
        api_base: config.api_base.clone(),
        bot_token: cli.bot_token,
        request_timeout_ms: config.request_timeout_ms,
        retry_max_attempts: config.retry_max_attempts,
        retry_base_delay_ms: config.retry_base_delay_ms,
    })
    .context("failed to build session client")?);

    let report_peers = ReportPeerSlot::new();
    let runtime = SessionRuntime::new(
        config.runtime_config(),
        client.clone(),
        report_peers.clone(),
    );
    let reporter = FailureReporter::new(client, report_peers);
    let supervisor = Supervisor::new(
        SupervisorConfig {
            max_restarts: config.max_restarts,
            backoff_base_ms: config.restart_backoff_base_ms,
        },
        reporter,
    );

    match supervisor.run(|| runtime.start_and_serve()).await {
        SupervisorOutcome::CleanShutdown => Ok(ExitCode::SUCCESS),
        SupervisorOutcome::RetriesExhausted { attempts } => {
            tracing::error!(attempts, "session retries exhausted; giving up");
            Ok(ExitCode::FAILURE)
        }
    }
}
