//! Shared domain types for the distributed arithmetic evaluation network.
//!
//! Every crate in the workspace that needs to name a Task, a Worker, an
//! operator, or one of the error kinds from the system's error taxonomy
//! depends on this crate rather than redefining them.

pub mod error;
pub mod ids;
pub mod operator;
pub mod task;
pub mod worker;

pub use error::{CalcError, CalcResult};
pub use ids::{TaskId, WorkerId};
pub use operator::{Operator, OperatorTimeouts};
pub use task::{Task, TaskStatus};
pub use worker::{Worker, WorkerStatus};
