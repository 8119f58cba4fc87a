//! Coordinator dispatch API (C5, `spec.md` §4.5).
//!
//! This is the only thing the HTTP admission surface talks to; it carries
//! no axum types, so it can be exercised directly from integration tests
//! without binding a socket.

use calc_protocol::{Broker, TaskMessage};
use calc_store::Store;
use calc_types::{CalcResult, Operator, OperatorTimeouts, Task, TaskId, Worker, WorkerId};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Ties storage, the broker, and the live operator-timeout table together
/// behind the operations `spec.md` §4.5 names.
pub struct Coordinator {
    pub store: Arc<dyn Store>,
    pub broker: Arc<dyn Broker>,
    timeouts: RwLock<OperatorTimeouts>,
}

impl Coordinator {
    pub fn new(store: Arc<dyn Store>, broker: Arc<dyn Broker>, initial_timeouts: OperatorTimeouts) -> Arc<Self> {
        Arc::new(Self {
            store,
            broker,
            timeouts: RwLock::new(initial_timeouts),
        })
    }

    #[instrument(skip(self))]
    pub async fn register_worker(&self) -> CalcResult<WorkerId> {
        let worker = Worker::register_now();
        let id = worker.id;
        self.store.insert_worker(worker).await?;
        info!(worker_id = %id, "worker registered");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn ping_worker(&self, id: WorkerId) -> CalcResult<bool> {
        let ok = self.store.ping_worker(id, Utc::now()).await?;
        if ok {
            info!(worker_id = %id, "heartbeat received");
        }
        Ok(ok)
    }

    #[instrument(skip(self, expression))]
    pub async fn submit_expression(&self, expression: String) -> CalcResult<TaskId> {
        let task = Task::new_accepted(expression.clone());
        let id = task.id;
        let timeouts = *self.timeouts.read().await;
        self.store.insert_task(task).await?;
        self.broker
            .publish_task(TaskMessage {
                id,
                expression,
                timeouts,
            })
            .await?;
        info!(task_id = %id, "expression submitted");
        Ok(id)
    }

    pub async fn get_task(&self, id: TaskId) -> CalcResult<Option<Task>> {
        self.store.get_task(id).await
    }

    pub async fn list_tasks(&self) -> CalcResult<Vec<Task>> {
        self.store.list_tasks().await
    }

    pub async fn list_workers(&self) -> CalcResult<Vec<Worker>> {
        self.store.list_workers().await
    }

    pub async fn set_timeouts(&self, new_timeouts: OperatorTimeouts) {
        *self.timeouts.write().await = new_timeouts;
    }

    pub async fn get_timeouts(&self) -> OperatorTimeouts {
        *self.timeouts.read().await
    }

    pub(crate) async fn current_timeouts(&self) -> OperatorTimeouts {
        *self.timeouts.read().await
    }
}

/// The four operators the timeout table covers, for rendering.
pub const ALL_OPERATORS: [Operator; 4] = Operator::ALL;
