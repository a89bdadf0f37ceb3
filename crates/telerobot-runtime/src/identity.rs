//! Startup-resolved identity and the failure-report peer set.

use std::sync::{Arc, Mutex, MutexGuard};

use telerobot_core::current_unix_timestamp;

/// The bot's own account plus the configured owner, resolved once during
/// the startup transition and immutable afterwards.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub robot_id: i64,
    pub owner_id: Option<i64>,
    pub start_unix: u64,
}

impl BotIdentity {
    pub fn resolve(robot_id: i64, owner_id: Option<i64>) -> Self {
        Self {
            robot_id,
            owner_id,
            start_unix: current_unix_timestamp(),
        }
    }

    pub fn uptime_seconds(&self, now_unix: u64) -> u64 {
        now_unix.saturating_sub(self.start_unix)
    }
}

/// Maps configured report-peer entries onto concrete peer ids.
///
/// `robot` resolves to the bot itself; `owner` resolves to the configured
/// owner unless it would duplicate the bot; anything else must be a literal
/// numeric peer id. Resolved ids are deduplicated, first occurrence wins.
pub fn build_report_peers(entries: &[String], robot_id: i64, owner_id: Option<i64>) -> Vec<i64> {
    let mut peers: Vec<i64> = Vec::new();
    for entry in entries {
        match entry.trim().to_ascii_lowercase().as_str() {
            "robot" => push_unique(&mut peers, robot_id),
            "owner" => {
                if let Some(owner_id) = owner_id {
                    if owner_id != robot_id {
                        push_unique(&mut peers, owner_id);
                    }
                }
            }
            literal => match literal.parse::<i64>() {
                Ok(peer) => push_unique(&mut peers, peer),
                Err(_) => {
                    tracing::warn!(
                        entry = %entry,
                        "skipping report peer that is not robot, owner, or a numeric id"
                    );
                }
            },
        }
    }
    peers
}

fn push_unique(peers: &mut Vec<i64>, peer: i64) {
    if !peers.contains(&peer) {
        peers.push(peer);
    }
}

/// Shared view of the resolved report peers.
///
/// Written once per startup before the event loop and the periodic task
/// begin, then only read; the supervisor snapshots it when reporting a
/// fatal session failure.
#[derive(Debug, Clone, Default)]
pub struct ReportPeerSlot {
    peers: Arc<Mutex<Vec<i64>>>,
}

impl ReportPeerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, peers: Vec<i64>) {
        *lock_or_recover(&self.peers) = peers;
    }

    pub fn snapshot(&self) -> Vec<i64> {
        lock_or_recover(&self.peers).clone()
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_report_peers, BotIdentity, ReportPeerSlot};

    fn entries(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|entry| entry.to_string()).collect()
    }

    #[test]
    fn unit_build_report_peers_resolves_symbolic_entries() {
        let peers = build_report_peers(&entries(&["robot", "owner", "12345"]), 42, Some(7));
        assert_eq!(peers, vec![42, 7, 12_345]);
    }

    #[test]
    fn unit_build_report_peers_drops_owner_equal_to_robot() {
        let peers = build_report_peers(&entries(&["robot", "owner"]), 42, Some(42));
        assert_eq!(peers, vec![42]);
    }

    #[test]
    fn unit_build_report_peers_never_duplicates_owner() {
        let peers = build_report_peers(&entries(&["owner", "owner", "7"]), 42, Some(7));
        assert_eq!(peers, vec![7]);
    }

    #[test]
    fn unit_build_report_peers_without_owner_configured() {
        let peers = build_report_peers(&entries(&["owner", "robot"]), 42, None);
        assert_eq!(peers, vec![42]);
    }

    #[test]
    fn unit_build_report_peers_skips_non_numeric_literals() {
        let peers = build_report_peers(&entries(&["@someone", "99"]), 42, None);
        assert_eq!(peers, vec![99]);
    }

    #[test]
    fn unit_report_peer_slot_snapshot_reflects_latest_publish() {
        let slot = ReportPeerSlot::new();
        assert!(slot.snapshot().is_empty());
        slot.publish(vec![1, 2]);
        assert_eq!(slot.snapshot(), vec![1, 2]);
        slot.publish(vec![3]);
        assert_eq!(slot.snapshot(), vec![3]);
    }

    #[test]
    fn unit_uptime_seconds_never_underflows() {
        let identity = BotIdentity {
            robot_id: 1,
            owner_id: None,
            start_unix: 1_000,
        };
        assert_eq!(identity.uptime_seconds(1_090), 90);
        assert_eq!(identity.uptime_seconds(500), 0);
    }
}
