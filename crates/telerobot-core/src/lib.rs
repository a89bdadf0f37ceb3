//! Foundational low-level utilities shared across telerobot crates.
//!
//! Provides time helpers, uptime/byte-size formatting for the status
//! commands, a resident-memory probe, and the rotating JSONL log writer
//! backing the audit trail.

pub mod event_log;
pub mod format;
pub mod mem_usage;
pub mod time_utils;

pub use event_log::{append_line_with_rotation, reset_log_file, LogRotationPolicy};
pub use format::{format_byte_size, format_uptime};
pub use mem_usage::resident_memory_bytes;
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms};
