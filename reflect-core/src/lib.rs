//! Core identifiers, severity bands, and the shared error taxonomy used by
//! every crate in the reflection agent runtime.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod severity;

/// Error type and result alias shared across the runtime's core types.
pub use error::{Error, Result};
/// Identifiers for agents, observers, situations, tasks, capabilities, and grants.
pub use ids::{AgentId, CapabilityId, GrantId, ObserverId, SituationId, TaskId};
/// Severity banding shared by observations, situations, and escalations.
pub use severity::Severity;
