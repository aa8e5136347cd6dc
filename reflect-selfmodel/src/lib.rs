//! The self model: what this agent believes it can do, how available each
//! capability currently is, and how loaded the process is right now.

#![warn(missing_docs, clippy::pedantic)]

mod descriptor;
mod error;
mod load;
mod model;

/// Capability descriptor type registered with a [`SelfModel`].
pub use descriptor::CapabilityDescriptor;
/// Error type and result alias for self-model operations.
pub use error::{SelfModelError, SelfModelResult};
/// A point-in-time read of process and runtime load.
pub use load::LoadSnapshot;
/// The self model itself.
pub use model::SelfModel;
