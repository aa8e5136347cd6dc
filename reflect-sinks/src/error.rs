//! Error types shared by every sink.

use thiserror::Error;

/// Error returned by a sink's delivery attempt. Sink failures are always
/// non-fatal at the loop boundary: callers log and continue.
#[derive(Debug, Error)]
#[error("sink delivery failed: {reason}")]
pub struct SinkError {
    /// Human-readable explanation for logging and operators.
    pub reason: String,
}

impl SinkError {
    /// Builds a sink error from any displayable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Result alias for sink delivery operations.
pub type SinkResult<T> = Result<T, SinkError>;
