//! JSON configuration file with per-field defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use telerobot_runtime::RuntimeConfig;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_AUDIT_LOG_FILE: &str = "telerobot-audit.jsonl";

fn default_true() -> bool {
    true
}

fn default_max_restarts() -> u32 {
    1
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_AUDIT_LOG_FILE)
}

fn default_poll_timeout_seconds() -> u64 {
    25
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_retry_max_attempts() -> usize {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    250
}

fn default_restart_backoff_base_ms() -> u64 {
    2_000
}

fn default_periodic_interval_seconds() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// On-disk daemon configuration; every field has a usable default so a
/// missing or partial file still yields a runnable setup.
pub(crate) struct RobotConfig {
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub report_peers: Vec<String>,
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
    #[serde(default = "default_true")]
    pub delete_log: bool,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_audit_log_path")]
    pub audit_log_path: PathBuf,
    #[serde(default = "default_poll_timeout_seconds")]
    pub poll_timeout_seconds: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: usize,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_restart_backoff_base_ms")]
    pub restart_backoff_base_ms: u64,
    #[serde(default = "default_periodic_interval_seconds")]
    pub periodic_interval_seconds: u64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            owner_id: None,
            report_peers: Vec::new(),
            max_restarts: default_max_restarts(),
            delete_log: true,
            api_base: default_api_base(),
            audit_log_path: default_audit_log_path(),
            poll_timeout_seconds: default_poll_timeout_seconds(),
            request_timeout_ms: default_request_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            restart_backoff_base_ms: default_restart_backoff_base_ms(),
            periodic_interval_seconds: default_periodic_interval_seconds(),
        }
    }
}

impl RobotConfig {
    /// Loads the configuration file; a missing file yields full defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub(crate) fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            owner_id: self.owner_id,
            report_peers: self.report_peers.clone(),
            poll_timeout_seconds: self.poll_timeout_seconds,
            periodic_interval_seconds: self.periodic_interval_seconds,
            audit_log_path: Some(self.audit_log_path.clone()),
        }
    }
}
