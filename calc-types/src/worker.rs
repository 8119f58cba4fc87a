//! The `Worker` entity (`spec.md` §3).

use crate::ids::WorkerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness state of a registered worker, as tracked by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkerStatus {
    Active,
    Inactive,
}

/// A registered worker and its last observed heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub status: WorkerStatus,
    pub last_seen: DateTime<Utc>,
}

impl Worker {
    pub fn register_now() -> Self {
        Self {
            id: WorkerId::new(),
            status: WorkerStatus::Active,
            last_seen: Utc::now(),
        }
    }

    /// Apply a ping: marks the worker active and bumps `last_seen`, unless
    /// the new timestamp would move it backwards (`last_seen` is
    /// monotonically non-decreasing per `spec.md` §3).
    pub fn ping(&mut self, at: DateTime<Utc>) {
        if at > self.last_seen {
            self.last_seen = at;
        }
        self.status = WorkerStatus::Active;
    }
}
