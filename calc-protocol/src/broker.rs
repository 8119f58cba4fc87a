//! Broker abstraction over the three named queues (`spec.md` §6).
//!
//! The real broker is an external collaborator the core only ever talks
//! to through this trait (`spec.md` §1). `InMemoryBroker` is a reference
//! implementation good enough to run the whole system in one process: a
//! production deployment swaps it for a client of an actual broker without
//! touching the coordinator or worker runtime.

use crate::messages::{ClaimMessage, ResultMessage, TaskMessage};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

#[derive(Error, Debug, Clone)]
#[error("broker error: {0}")]
pub struct BrokerError(pub String);

impl From<BrokerError> for calc_types::CalcError {
    fn from(e: BrokerError) -> Self {
        calc_types::CalcError::TransientIO(e.0)
    }
}

/// Publish/subscribe over `tasks`, `claims` and `results`.
///
/// `tasks` is a competing-consumers queue: many workers may call
/// `recv_task` concurrently, but each published `TaskMessage` is delivered
/// to exactly one of them. `claims` and `results` are naturally
/// multi-producer/single-consumer: many workers publish, one coordinator
/// drains each with `recv_claim` / `recv_result`.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn publish_task(&self, msg: TaskMessage) -> Result<(), BrokerError>;
    async fn publish_claim(&self, msg: ClaimMessage) -> Result<(), BrokerError>;
    async fn publish_result(&self, msg: ResultMessage) -> Result<(), BrokerError>;

    /// Blocks until a `TaskMessage` is available or the broker is closed.
    async fn recv_task(&self) -> Option<TaskMessage>;
    /// Blocks until a `ClaimMessage` is available or the broker is closed.
    async fn recv_claim(&self) -> Option<ClaimMessage>;
    /// Blocks until a `ResultMessage` is available or the broker is closed.
    async fn recv_result(&self) -> Option<ResultMessage>;
}

struct Queue<T> {
    tx: mpsc::Sender<T>,
    rx: Mutex<mpsc::Receiver<T>>,
}

impl<T: Send + 'static> Queue<T> {
    fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    fn publish(&self, msg: T) -> Result<(), BrokerError> {
        self.tx
            .try_send(msg)
            .map_err(|e| BrokerError(format!("queue full or closed: {e}")))
    }

    async fn recv(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }
}

/// Auto-ack, at-most-once, in-memory broker: a message handed to
/// `recv_task`/`recv_claim`/`recv_result` is removed from the queue
/// immediately, exactly like the real broker's auto-ack consumers
/// (`spec.md` §4.4, §6). Genuine at-least-once redelivery is a property of
/// the real broker this trait stands in for, not of this reference
/// implementation.
pub struct InMemoryBroker {
    tasks: Queue<TaskMessage>,
    claims: Queue<ClaimMessage>,
    results: Queue<ResultMessage>,
}

impl InMemoryBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: Queue::new(1024),
            claims: Queue::new(1024),
            results: Queue::new(1024),
        })
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self {
            tasks: Queue::new(1024),
            claims: Queue::new(1024),
            results: Queue::new(1024),
        }
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish_task(&self, msg: TaskMessage) -> Result<(), BrokerError> {
        self.tasks.publish(msg).inspect_err(|e| warn!(%e, "publish_task failed"))
    }

    async fn publish_claim(&self, msg: ClaimMessage) -> Result<(), BrokerError> {
        self.claims.publish(msg).inspect_err(|e| warn!(%e, "publish_claim failed"))
    }

    async fn publish_result(&self, msg: ResultMessage) -> Result<(), BrokerError> {
        self.results.publish(msg).inspect_err(|e| warn!(%e, "publish_result failed"))
    }

    async fn recv_task(&self) -> Option<TaskMessage> {
        self.tasks.recv().await
    }

    async fn recv_claim(&self) -> Option<ClaimMessage> {
        self.claims.recv().await
    }

    async fn recv_result(&self) -> Option<ResultMessage> {
        self.results.recv().await
    }
}
