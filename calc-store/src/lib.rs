//! Key-addressed record store for `Task` and `Worker` entities
//! (`spec.md` §1, §3, §5).
//!
//! The store is the external collaborator `spec.md` specifies only by the
//! operations the core calls on it: *insert*, *update-field*,
//! *lookup-by-id*, *scan-all*. This crate exposes those as a small,
//! object-safe `Store` trait plus `InMemoryStore`, a `DashMap`-backed
//! reference implementation whose per-shard locking gives the per-Task /
//! per-Worker serialization `spec.md` §5 requires without one
//! coarse-grained mutex over all rows. A production deployment can swap in
//! a Postgres-backed `Store` behind the same trait; none is built here
//! since persistent storage is an explicit Non-goal of the core.

mod in_memory;

pub use in_memory::InMemoryStore;

use async_trait::async_trait;
use calc_types::{CalcResult, Task, TaskId, TaskStatus, Worker, WorkerId};
use chrono::{DateTime, Utc};

/// Outcome of applying a `ClaimMessage` to a stored task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The task was non-terminal; claimant and status were updated.
    Applied,
    /// The task was already terminal; the claim was dropped as stale
    /// (`spec.md` §5).
    Stale,
}

#[async_trait]
pub trait Store: Send + Sync {
    // -- Task operations --

    async fn insert_task(&self, task: Task) -> CalcResult<()>;
    async fn get_task(&self, id: TaskId) -> CalcResult<Option<Task>>;
    async fn list_tasks(&self) -> CalcResult<Vec<Task>>;

    /// Apply a `ClaimMessage`: set `claimant` and `status = CALCULATING`,
    /// unless the task is already terminal, in which case the claim is
    /// dropped as stale (`spec.md` §5).
    async fn apply_claim(&self, task_id: TaskId, worker_id: WorkerId) -> CalcResult<ClaimOutcome>;

    /// Apply a `ResultMessage`: set `status` and `result`, regardless of
    /// the task's current non-terminal status (it may still be
    /// `ACCEPTED` if the result raced ahead of the claim, `spec.md` §5).
    /// A duplicate result for an already-terminal task is a no-op: the
    /// terminal write is monotonic (`spec.md` §3).
    async fn apply_result(&self, task_id: TaskId, status: TaskStatus, result: String) -> CalcResult<()>;

    /// Compare-and-set: transition a task from `CALCULATING` to
    /// `REPUBLISHED`. Returns `true` iff the transition was applied —
    /// `false` means the task moved on (to a terminal state) between the
    /// sweep's scan and this call, and the caller must not republish it.
    async fn republish_if_calculating(&self, task_id: TaskId) -> CalcResult<bool>;

    // -- Worker operations --

    async fn insert_worker(&self, worker: Worker) -> CalcResult<()>;
    async fn get_worker(&self, id: WorkerId) -> CalcResult<Option<Worker>>;
    async fn list_workers(&self) -> CalcResult<Vec<Worker>>;

    /// Apply a ping: mark the worker `ACTIVE` and bump `last_seen`
    /// (monotonically, `spec.md` §3). Returns `false` if the worker is
    /// unknown.
    async fn ping_worker(&self, id: WorkerId, at: DateTime<Utc>) -> CalcResult<bool>;

    /// Mark a worker `INACTIVE`. Used by the heartbeat sweep.
    async fn mark_worker_inactive(&self, id: WorkerId) -> CalcResult<()>;
}
