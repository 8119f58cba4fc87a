//! Message codec and broker abstraction (`spec.md` §4.3, §6).
//!
//! Mirrors the teacher's `communication` module shape: a `messages`
//! submodule defining the wire types, and a `broker` submodule defining
//! the transport they travel over.

pub mod broker;
pub mod messages;

pub use broker::{Broker, BrokerError, InMemoryBroker};
pub use messages::{ClaimMessage, ResultMessage, TaskMessage, CLAIMS_QUEUE, RESULTS_QUEUE, TASKS_QUEUE};
