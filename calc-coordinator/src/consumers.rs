//! The `claims` and `results` queue consumers (`spec.md` §4.5).
//!
//! Ordering across the two queues is not guaranteed, so both consumers
//! tolerate a Task in any non-terminal state: `calc-store` already
//! encodes the claim-drops-if-terminal and result-applies-even-if-ACCEPTED
//! rules (`spec.md` §5), so these loops just forward each message.

use crate::dispatch::Coordinator;
use calc_store::ClaimOutcome;
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn claims_consumer_loop(coordinator: Arc<Coordinator>) {
    loop {
        match coordinator.broker.recv_claim().await {
            Some(msg) => match coordinator.store.apply_claim(msg.task_id, msg.worker_id).await {
                Ok(ClaimOutcome::Applied) => {
                    info!(task_id = %msg.task_id, worker_id = %msg.worker_id, "claim applied");
                }
                Ok(ClaimOutcome::Stale) => {
                    warn!(task_id = %msg.task_id, "dropped stale claim for terminal task");
                }
                Err(e) => error!(task_id = %msg.task_id, error = %e, "failed to apply claim"),
            },
            None => {
                info!("claims queue closed, stopping claims consumer");
                return;
            }
        }
    }
}

pub async fn results_consumer_loop(coordinator: Arc<Coordinator>) {
    loop {
        match coordinator.broker.recv_result().await {
            Some(msg) => {
                let status = match msg.status {
                    calc_protocol::ResultStatus::Completed => calc_types::TaskStatus::Completed,
                    calc_protocol::ResultStatus::Invalid => calc_types::TaskStatus::Invalid,
                };
                if let Err(e) = coordinator.store.apply_result(msg.id, status, msg.result).await {
                    error!(task_id = %msg.id, error = %e, "failed to apply result");
                } else {
                    info!(task_id = %msg.id, ?status, "result applied");
                }
            }
            None => {
                info!("results queue closed, stopping results consumer");
                return;
            }
        }
    }
}
