//! Tunables for the permission broker's default grant lifetime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env::parse_or;
use crate::error::ConfigResult;

/// Default time-to-live for a freshly issued grant.
pub const DEFAULT_GRANT_TTL_SECS: u64 = 300;

/// Configuration for [`reflect_broker::PermissionBroker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Time-to-live applied to grants issued without an explicit override.
    pub default_grant_ttl: Duration,
}

impl BrokerConfig {
    /// Builds a config from `REFLECT_GRANT_TTL_SECS`, falling back to the
    /// documented default when unset.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ConfigError`] if the variable is set to a value
    /// that fails to parse.
    pub fn from_env() -> ConfigResult<Self> {
        let ttl_secs: u64 = parse_or("REFLECT_GRANT_TTL_SECS", DEFAULT_GRANT_TTL_SECS)?;
        Ok(Self {
            default_grant_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            default_grant_ttl: Duration::from_secs(DEFAULT_GRANT_TTL_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_five_minutes() {
        assert_eq!(BrokerConfig::default().default_grant_ttl, Duration::from_secs(300));
    }
}
