//! Liveness and recovery sweeps (C6, `spec.md` §4.6).

use crate::dispatch::Coordinator;
use calc_protocol::TaskMessage;
use calc_types::{TaskStatus, WorkerStatus};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Every `interval`, mark any Worker whose `last_seen` is older than
/// `interval` as `INACTIVE`. Recovery to `ACTIVE` happens implicitly on
/// the worker's next ping, not here.
pub async fn heartbeat_sweep_loop(coordinator: Arc<Coordinator>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let workers = match coordinator.store.list_workers().await {
            Ok(w) => w,
            Err(e) => {
                error!(error = %e, "heartbeat sweep failed to list workers");
                continue;
            }
        };
        let now = Utc::now();
        let stale_after = chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::max_value());
        for worker in workers {
            if worker.status == WorkerStatus::Active
                && now.signed_duration_since(worker.last_seen) > stale_after
            {
                if let Err(e) = coordinator.store.mark_worker_inactive(worker.id).await {
                    error!(worker_id = %worker.id, error = %e, "failed to mark worker inactive");
                } else {
                    warn!(worker_id = %worker.id, "worker marked INACTIVE by heartbeat sweep");
                }
            }
        }
    }
}

/// Every `interval`, scan CALCULATING tasks; any whose claimant has gone
/// INACTIVE is republished on `tasks` and transitioned to REPUBLISHED.
pub async fn task_check_sweep_loop(coordinator: Arc<Coordinator>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let tasks = match coordinator.store.list_tasks().await {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "task-status sweep failed to list tasks");
                continue;
            }
        };

        for task in tasks {
            if task.status != TaskStatus::Calculating {
                continue;
            }
            let Some(claimant) = task.claimant else {
                continue;
            };
            let claimant_inactive = match coordinator.store.get_worker(claimant).await {
                Ok(Some(worker)) => worker.status == WorkerStatus::Inactive,
                Ok(None) => true,
                Err(e) => {
                    error!(task_id = %task.id, error = %e, "task-status sweep failed to look up claimant");
                    continue;
                }
            };
            if !claimant_inactive {
                continue;
            }

            match coordinator.store.republish_if_calculating(task.id).await {
                Ok(true) => {
                    let timeouts = coordinator.current_timeouts().await;
                    if let Err(e) = coordinator
                        .broker
                        .publish_task(TaskMessage {
                            id: task.id,
                            expression: task.expression.clone(),
                            timeouts,
                        })
                        .await
                    {
                        error!(task_id = %task.id, error = %e, "failed to republish task");
                    } else {
                        info!(task_id = %task.id, "task republished after claimant went inactive");
                    }
                }
                Ok(false) => {
                    // Task moved on between the scan and this call; do not republish.
                }
                Err(e) => error!(task_id = %task.id, error = %e, "republish compare-and-set failed"),
            }
        }
    }
}
