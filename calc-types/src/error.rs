//! Error taxonomy (`spec.md` §7).
//!
//! These are kinds, not a one-to-one mirror of every failure site: the
//! compiler and evaluator both fail with `InvalidExpression` /
//! `EvaluationFailure`, the store and broker both fail with `TransientIO`,
//! and HTTP handlers turn `BadRequest` / `TransientIO` into status codes.

use thiserror::Error;

pub type CalcResult<T> = Result<T, CalcError>;

#[derive(Error, Debug, Clone)]
pub enum CalcError {
    /// Syntactic/structural rejection by the expression compiler.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// Runtime arithmetic fault in the parallel evaluator (e.g. division
    /// by zero).
    #[error("evaluation failed: {0}")]
    EvaluationFailure(String),

    /// Broker or storage operation failed; the caller should log and
    /// continue on its next tick rather than propagate further.
    #[error("transient I/O failure: {0}")]
    TransientIO(String),

    /// Malformed HTTP input; no state change has been made.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Cannot connect to the broker or store at startup.
    #[error("fatal boot failure: {0}")]
    FatalBoot(String),
}

impl CalcError {
    /// Both expression-level error kinds terminate a Task as INVALID with
    /// no further evaluation; everything else is a process-level concern.
    pub fn is_task_terminal(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidExpression(_) | CalcError::EvaluationFailure(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_expression_level_errors_are_task_terminal() {
        assert!(CalcError::InvalidExpression("x".into()).is_task_terminal());
        assert!(CalcError::EvaluationFailure("x".into()).is_task_terminal());
        assert!(!CalcError::TransientIO("x".into()).is_task_terminal());
        assert!(!CalcError::BadRequest("x".into()).is_task_terminal());
        assert!(!CalcError::FatalBoot("x".into()).is_task_terminal());
    }
}
