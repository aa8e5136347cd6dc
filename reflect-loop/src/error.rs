//! Errors surfaced by the reflection loop's lifecycle.

use thiserror::Error;

/// Result alias for reflection loop lifecycle operations.
pub type LoopResult<T> = Result<T, LoopError>;

/// Errors returned directly to the caller. Per-cycle failures (observer,
/// memory, escalation, oracle) are logged, not returned here.
#[derive(Debug, Error)]
pub enum LoopError {
    /// `start` was called while the loop was already running.
    #[error("reflection loop is already running")]
    AlreadyRunning,
}
