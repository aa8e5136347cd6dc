//! Error types for the decision policy.

use thiserror::Error;

/// Errors surfaced while constructing or configuring a [`crate::DecisionPolicy`].
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The supplied handle/escalate thresholds violate `0 <= handle < escalate <= 10`.
    #[error("invalid policy thresholds: handle={handle}, escalate={escalate}")]
    InvalidThresholds {
        /// The rejected handle threshold.
        handle: u8,
        /// The rejected escalate threshold.
        escalate: u8,
    },
}

/// Result alias for policy configuration operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
