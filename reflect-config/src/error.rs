//! Errors surfaced while loading configuration from the environment.

use thiserror::Error;

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced while building a config struct from environment
/// variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed as the
    /// expected type.
    #[error("environment variable `{key}` is invalid: {reason}")]
    InvalidValue {
        /// The variable's name.
        key: String,
        /// Why parsing failed.
        reason: String,
    },
    /// An environment variable was set but was not valid UTF-8.
    #[error("environment variable `{key}` is not valid unicode")]
    NotUnicode {
        /// The variable's name.
        key: String,
    },
}
