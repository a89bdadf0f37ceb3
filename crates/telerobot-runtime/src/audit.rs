//! JSONL audit trail of self-related traffic.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;
use telerobot_core::{append_line_with_rotation, current_unix_timestamp_ms, LogRotationPolicy};
use telerobot_telegram::RawUpdate;

/// Rotation-aware appender for the raw updates the dispatcher decides to
/// keep on record.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    policy: LogRotationPolicy,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            policy: LogRotationPolicy::from_env(),
        }
    }

    pub fn append(&self, update: &RawUpdate) -> Result<()> {
        let entry = json!({
            "timestamp_unix_ms": current_unix_timestamp_ms(),
            "update": update,
        });
        append_line_with_rotation(&self.path, &entry.to_string(), self.policy)
    }
}
