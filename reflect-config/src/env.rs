//! Shared environment-variable parsing helpers used by every config struct.

use std::env::VarError;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};

/// Reads `key` from the environment and parses it with `FromStr`, falling
/// back to `default` when the variable is unset.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the variable is set but fails to
/// parse, or [`ConfigError::NotUnicode`] if it is set but not valid UTF-8.
pub(crate) fn parse_or<T>(key: &str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|err| ConfigError::InvalidValue {
            key: key.to_owned(),
            reason: err.to_string(),
        }),
        Err(VarError::NotPresent) => Ok(default),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { key: key.to_owned() }),
    }
}

/// Reads `key` from the environment as a plain string, falling back to
/// `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::NotUnicode`] if the variable is set but not valid
/// UTF-8.
pub(crate) fn string_or(key: &str, default: impl Into<String>) -> ConfigResult<String> {
    match std::env::var(key) {
        Ok(raw) => Ok(raw),
        Err(VarError::NotPresent) => Ok(default.into()),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { key: key.to_owned() }),
    }
}
