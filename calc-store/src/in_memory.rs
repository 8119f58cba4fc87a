use crate::{ClaimOutcome, Store};
use async_trait::async_trait;
use calc_types::{CalcResult, Task, TaskId, TaskStatus, Worker, WorkerId, WorkerStatus};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::trace;

/// In-memory record store. Each `Task` and `Worker` row lives behind its
/// own `DashMap` shard lock, so concurrent readers/writers only serialize
/// on the rows they actually touch.
#[derive(Default)]
pub struct InMemoryStore {
    tasks: DashMap<TaskId, Task>,
    workers: DashMap<WorkerId, Worker>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_task(&self, task: Task) -> CalcResult<()> {
        trace!(task_id = %task.id, "insert_task");
        self.tasks.insert(task.id, task);
        Ok(())
    }

    async fn get_task(&self, id: TaskId) -> CalcResult<Option<Task>> {
        Ok(self.tasks.get(&id).map(|r| r.value().clone()))
    }

    async fn list_tasks(&self) -> CalcResult<Vec<Task>> {
        Ok(self.tasks.iter().map(|r| r.value().clone()).collect())
    }

    async fn apply_claim(&self, task_id: TaskId, worker_id: WorkerId) -> CalcResult<ClaimOutcome> {
        let Some(mut entry) = self.tasks.get_mut(&task_id) else {
            return Ok(ClaimOutcome::Stale);
        };
        if entry.status.is_terminal() {
            trace!(%task_id, "dropping stale claim for terminal task");
            return Ok(ClaimOutcome::Stale);
        }
        entry.claimant = Some(worker_id);
        entry.status = TaskStatus::Calculating;
        Ok(ClaimOutcome::Applied)
    }

    async fn apply_result(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        result: String,
    ) -> CalcResult<()> {
        let Some(mut entry) = self.tasks.get_mut(&task_id) else {
            trace!(%task_id, "result for unknown task, dropping");
            return Ok(());
        };
        if entry.status.is_terminal() {
            trace!(%task_id, "dropping duplicate result for terminal task");
            return Ok(());
        }
        entry.status = status;
        entry.result = result;
        Ok(())
    }

    async fn republish_if_calculating(&self, task_id: TaskId) -> CalcResult<bool> {
        let Some(mut entry) = self.tasks.get_mut(&task_id) else {
            return Ok(false);
        };
        if entry.status == TaskStatus::Calculating {
            entry.status = TaskStatus::Republished;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn insert_worker(&self, worker: Worker) -> CalcResult<()> {
        self.workers.insert(worker.id, worker);
        Ok(())
    }

    async fn get_worker(&self, id: WorkerId) -> CalcResult<Option<Worker>> {
        Ok(self.workers.get(&id).map(|r| r.value().clone()))
    }

    async fn list_workers(&self) -> CalcResult<Vec<Worker>> {
        Ok(self.workers.iter().map(|r| r.value().clone()).collect())
    }

    async fn ping_worker(&self, id: WorkerId, at: DateTime<Utc>) -> CalcResult<bool> {
        let Some(mut entry) = self.workers.get_mut(&id) else {
            return Ok(false);
        };
        entry.ping(at);
        Ok(true)
    }

    async fn mark_worker_inactive(&self, id: WorkerId) -> CalcResult<()> {
        if let Some(mut entry) = self.workers.get_mut(&id) {
            entry.status = WorkerStatus::Inactive;
        }
        Ok(())
    }
}
