//! The `Task` entity (`spec.md` §3).

use crate::ids::{TaskId, WorkerId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a submitted expression.
///
/// Valid transition paths (`spec.md` §8):
/// `ACCEPTED -> CALCULATING -> {COMPLETED, INVALID}` or
/// `CALCULATING -> REPUBLISHED -> CALCULATING -> {COMPLETED, INVALID}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Accepted,
    Calculating,
    Republished,
    Completed,
    Invalid,
}

impl TaskStatus {
    /// Terminal statuses are monotonic: no further mutation is permitted.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Invalid)
    }
}

/// A submitted expression and its evaluation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub expression: String,
    pub status: TaskStatus,
    /// String representation of the computed integer; empty until terminal.
    pub result: String,
    /// Nil until claimed; non-nil iff status has ever been CALCULATING.
    pub claimant: Option<WorkerId>,
}

impl Task {
    pub fn new_accepted(expression: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            expression: expression.into(),
            status: TaskStatus::Accepted,
            result: String::new(),
            claimant: None,
        }
    }
}
