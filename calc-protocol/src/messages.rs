//! The three self-describing message kinds (`spec.md` §4.3).
//!
//! Each kind travels on its own dedicated, non-durable, non-exclusive
//! queue. Fields carry `#[serde(default)]` where a future sender might
//! omit them, so decode stays forward-compatible with unknown/missing
//! fields as `spec.md` requires.

use calc_types::{OperatorTimeouts, TaskId, WorkerId};
use serde::{Deserialize, Serialize};

pub const TASKS_QUEUE: &str = "tasks";
pub const CLAIMS_QUEUE: &str = "claims";
pub const RESULTS_QUEUE: &str = "results";

/// Published by the coordinator when an expression is submitted, and
/// again by the task-status sweep when a `CALCULATING` task's claimant
/// has gone `INACTIVE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    pub id: TaskId,
    pub expression: String,
    pub timeouts: OperatorTimeouts,
}

/// Published by a worker immediately on receiving a `TaskMessage`, before
/// it begins evaluating. Must precede any `ResultMessage` for the same
/// task from the same worker (`spec.md` §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimMessage {
    pub task_id: TaskId,
    pub worker_id: WorkerId,
}

/// Published by a worker once `calc_compiler` + `calc_eval` have produced
/// a terminal outcome for a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    pub id: TaskId,
    pub result: String,
    pub status: ResultStatus,
}

/// The only two statuses a `ResultMessage` may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    Completed,
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_types::Operator;
    use std::time::Duration;

    #[test]
    fn task_message_roundtrips_through_json() {
        let mut timeouts = OperatorTimeouts::default();
        timeouts.set(Operator::Mul, Duration::from_secs(10));
        let msg = TaskMessage {
            id: TaskId::new(),
            expression: "2 * 3".into(),
            timeouts,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: TaskMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, msg.id);
        assert_eq!(back.expression, msg.expression);
        assert_eq!(back.timeouts.mul, Duration::from_secs(10));
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let json = r#"{"id":"2f5b9c2a-6e3d-4c3e-9a3b-4b6f9b9e1a1a","task_id":"2f5b9c2a-6e3d-4c3e-9a3b-4b6f9b9e1a1a","worker_id":"2f5b9c2a-6e3d-4c3e-9a3b-4b6f9b9e1a1a","future_field":"ignored"}"#;
        let claim: ClaimMessage = serde_json::from_str(json).unwrap();
        assert_eq!(claim.task_id.0, claim.worker_id.0);
    }
}
