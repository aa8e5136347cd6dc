//! Error types for the self model.

use reflect_core::CapabilityId;
use thiserror::Error;

/// Result alias for self-model operations.
pub type SelfModelResult<T> = Result<T, SelfModelError>;

/// Errors surfaced by [`crate::SelfModel`] operations.
#[derive(Debug, Error)]
pub enum SelfModelError {
    /// `set_available`/`record_use` referenced a capability that was never
    /// registered. Indicates a programmer error, not a runtime condition.
    #[error("unknown capability `{0}`")]
    UnknownCapability(CapabilityId),
}
