//! Worker runtime (`spec.md` §4.4): registration, the heartbeat loop, and
//! the serial task-consumer loop.

use calc_protocol::{Broker, ClaimMessage, ResultMessage, ResultStatus, TaskMessage};
use calc_types::{CalcError, WorkerId};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    id: WorkerId,
}

/// A running worker: its identity, an HTTP client to the coordinator's
/// admission surface, and a handle to the task/claim/result broker.
pub struct WorkerRuntime {
    pub id: WorkerId,
    coordinator_url: String,
    http: reqwest::Client,
    broker: Arc<dyn Broker>,
}

impl WorkerRuntime {
    /// Register with the coordinator's admission surface to obtain a
    /// worker id, the precondition for both background loops
    /// (`spec.md` §4.4).
    #[instrument(skip(broker))]
    pub async fn register(coordinator_url: String, broker: Arc<dyn Broker>) -> Result<Self, CalcError> {
        let http = reqwest::Client::new();
        let response = http
            .post(format!("{coordinator_url}/agents"))
            .send()
            .await
            .map_err(|e| CalcError::FatalBoot(format!("could not reach coordinator: {e}")))?;

        if !response.status().is_success() {
            return Err(CalcError::FatalBoot(format!(
                "coordinator rejected registration: {}",
                response.status()
            )));
        }

        let body: RegisterResponse = response
            .json()
            .await
            .map_err(|e| CalcError::FatalBoot(format!("malformed registration response: {e}")))?;

        info!(worker_id = %body.id, "registered with coordinator");
        Ok(Self {
            id: body.id,
            coordinator_url,
            http,
            broker,
        })
    }

    /// Background heartbeat activity: every `interval`, ping the
    /// coordinator. Failures are logged and never terminate the worker
    /// (`spec.md` §4.4).
    #[instrument(skip(self))]
    pub async fn heartbeat_loop(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let url = format!("{}/agents/{}/ping", self.coordinator_url, self.id);
            match self.http.post(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!(worker_id = %self.id, "heartbeat sent");
                }
                Ok(resp) => warn!(worker_id = %self.id, status = %resp.status(), "heartbeat rejected"),
                Err(e) => warn!(worker_id = %self.id, error = %e, "heartbeat failed"),
            }
        }
    }

    /// Background task activity: consume `TaskMessage`s one at a time.
    /// Reductions within a single task still run concurrently (`calc_eval`
    /// spawns them); this loop itself never overlaps two tasks on one
    /// worker (`spec.md` §4.4, §5).
    #[instrument(skip(self))]
    pub async fn task_loop(&self) {
        loop {
            match self.broker.recv_task().await {
                Some(msg) => self.handle_task(msg).await,
                None => {
                    info!(worker_id = %self.id, "task queue closed, stopping task loop");
                    return;
                }
            }
        }
    }

    #[instrument(skip(self, msg), fields(task_id = %msg.id))]
    async fn handle_task(&self, msg: TaskMessage) {
        // Claim must be announced before evaluation begins (`spec.md` §4.4, §5).
        if let Err(e) = self
            .broker
            .publish_claim(ClaimMessage {
                task_id: msg.id,
                worker_id: self.id,
            })
            .await
        {
            error!(task_id = %msg.id, error = %e, "failed to publish claim");
            return;
        }

        let outcome = match calc_compiler::compile(&msg.expression) {
            Err(e) => {
                warn!(task_id = %msg.id, error = %e, "expression failed to compile");
                (ResultStatus::Invalid, String::new())
            }
            Ok(postfix) => match calc_eval::evaluate(&postfix, &msg.timeouts).await {
                Ok(value) => (ResultStatus::Completed, value.to_string()),
                Err(e) => {
                    warn!(task_id = %msg.id, error = %e, "evaluation failed");
                    (ResultStatus::Invalid, String::new())
                }
            },
        };

        let (status, result) = outcome;
        if let Err(e) = self
            .broker
            .publish_result(ResultMessage {
                id: msg.id,
                result,
                status,
            })
            .await
        {
            error!(task_id = %msg.id, error = %e, "failed to publish result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_protocol::InMemoryBroker;
    use calc_types::OperatorTimeouts;

    fn dummy(id: WorkerId, broker: Arc<dyn Broker>) -> WorkerRuntime {
        WorkerRuntime {
            id,
            coordinator_url: "http://unused".into(),
            http: reqwest::Client::new(),
            broker,
        }
    }

    #[tokio::test]
    async fn handle_task_claims_before_publishing_a_result() {
        let broker = InMemoryBroker::new();
        let worker = dummy(WorkerId::new(), broker.clone());

        worker
            .handle_task(TaskMessage {
                id: calc_types::TaskId::new(),
                expression: "1 + 2".into(),
                timeouts: OperatorTimeouts::default(),
            })
            .await;

        let claim = broker.recv_claim().await.expect("claim published");
        assert_eq!(claim.worker_id, worker.id);
        let result = broker.recv_result().await.expect("result published");
        assert_eq!(result.result, "3");
        assert_eq!(result.status, ResultStatus::Completed);
    }

    #[tokio::test]
    async fn invalid_expression_publishes_invalid_result() {
        let broker = InMemoryBroker::new();
        let worker = dummy(WorkerId::new(), broker.clone());

        worker
            .handle_task(TaskMessage {
                id: calc_types::TaskId::new(),
                expression: "5 + + 2".into(),
                timeouts: OperatorTimeouts::default(),
            })
            .await;

        let _ = broker.recv_claim().await.unwrap();
        let result = broker.recv_result().await.unwrap();
        assert_eq!(result.status, ResultStatus::Invalid);
        assert!(result.result.is_empty());
    }

    #[tokio::test]
    async fn division_by_zero_publishes_invalid_result() {
        let broker = InMemoryBroker::new();
        let worker = dummy(WorkerId::new(), broker.clone());

        worker
            .handle_task(TaskMessage {
                id: calc_types::TaskId::new(),
                expression: "6 / 0".into(),
                timeouts: OperatorTimeouts::default(),
            })
            .await;

        let _ = broker.recv_claim().await.unwrap();
        let result = broker.recv_result().await.unwrap();
        assert_eq!(result.status, ResultStatus::Invalid);
    }
}
