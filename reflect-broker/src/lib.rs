//! The just-in-time permission broker: time-bounded capability grants keyed
//! by `(capability, task)`, a static policy-level table, and the orchestrator
//! that combines a task's required capabilities with that table.

#![warn(missing_docs, clippy::pedantic)]

mod broker;
mod coordinator;
mod error;
mod grant;

/// The permission broker itself.
pub use broker::PermissionBroker;
/// The JIT grant request orchestrator and its outcome.
pub use coordinator::{JitGrantCoordinator, JitGrantRequest, JitGrantResult};
/// Error type and result alias for broker mutations.
pub use error::{BrokerError, BrokerResult};
/// The grant type and the static policy-level enum.
pub use grant::{Grant, PolicyLevel};
