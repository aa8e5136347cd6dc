//! Shared error definitions for the reflection runtime's core types.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the reflection runtime's core crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating core identifier and severity types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided agent identifier could not be parsed.
    #[error("invalid agent id: {source}")]
    InvalidAgentId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Observer identifier failed validation.
    #[error("invalid observer id `{label}`: {reason}")]
    InvalidObserverId {
        /// The offending label.
        label: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },

    /// Situation identifier failed validation.
    #[error("invalid situation id `{label}`: {reason}")]
    InvalidSituationId {
        /// The offending label.
        label: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },

    /// Task identifier failed validation.
    #[error("invalid task id `{label}`: {reason}")]
    InvalidTaskId {
        /// The offending label.
        label: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },

    /// Capability identifier failed validation.
    #[error("invalid capability id `{label}`: {reason}")]
    InvalidCapabilityId {
        /// The offending label.
        label: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },

    /// A severity value fell outside the supported band.
    #[error("invalid severity {value}: {reason}")]
    InvalidSeverity {
        /// The rejected raw value.
        value: u8,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
}
