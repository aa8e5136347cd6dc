//! Error types for the memory subsystem.

use thiserror::Error;

/// Errors emitted by memory components.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Underlying I/O failure while reading or writing journal files.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },

    /// Serialization or deserialization error.
    #[error("serialization error: {source}")]
    Serialization {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },

    /// Memory entry content failed validation.
    #[error("invalid memory entry: {0}")]
    InvalidRecord(&'static str),
}

/// Result type alias for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;
