//! Error types for the observer registry.

use reflect_core::ObserverId;
use thiserror::Error;

/// Errors surfaced by [`crate::ObserverRegistry`] operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registration was attempted with an id already present in the registry.
    #[error("observer `{0}` is already registered")]
    DuplicateId(ObserverId),
}

/// Result alias for registry mutations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// An error reported by a single observer's `check` invocation.
#[derive(Debug, Clone, Error)]
#[error("observer `{observer_id}` failed: {reason}")]
pub struct ObserverError {
    /// The observer that failed.
    pub observer_id: ObserverId,
    /// Human-readable failure reason.
    pub reason: String,
}

impl ObserverError {
    /// Creates a new observer error.
    #[must_use]
    pub fn new(observer_id: ObserverId, reason: impl Into<String>) -> Self {
        Self {
            observer_id,
            reason: reason.into(),
        }
    }
}

/// Aggregates per-observer failures from a single `check_all` fan-out.
#[derive(Debug, Clone)]
pub struct AggregateError {
    failures: Vec<ObserverError>,
}

impl std::error::Error for AggregateError {}

impl AggregateError {
    /// Builds an aggregate from the per-observer failures collected during a
    /// fan-out. Returns `None` if `failures` is empty.
    #[must_use]
    pub fn from_failures(failures: Vec<ObserverError>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// Returns the individual per-observer failures.
    #[must_use]
    pub fn failures(&self) -> &[ObserverError] {
        &self.failures
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.observer_id, failure.reason))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}
