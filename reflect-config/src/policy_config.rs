//! Tunables for the decision policy's severity thresholds and learning
//! signal.

use serde::{Deserialize, Serialize};

use crate::env::parse_or;
use crate::error::ConfigResult;

/// Default severity at or above which a situation is handled rather than
/// ignored.
pub const DEFAULT_HANDLE_THRESHOLD: u8 = 5;
/// Default severity at or above which a situation is escalated rather than
/// handled.
pub const DEFAULT_ESCALATE_THRESHOLD: u8 = 7;
/// Default number of outcomes required before the learning signal applies.
pub const DEFAULT_MIN_SAMPLES: u32 = 5;
/// Default failure rate above which the learning signal escalates.
pub const DEFAULT_LEARNING_FAIL_THRESHOLD: f64 = 0.6;
/// Default number of entries retained in the evaluation history ring.
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Configuration for [`reflect_policy::DecisionPolicy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPolicyConfig {
    /// Severity at or above which a situation is handled.
    pub handle_threshold: u8,
    /// Severity at or above which a situation is escalated.
    pub escalate_threshold: u8,
    /// Minimum recorded outcomes before the learning signal can fire.
    pub min_samples: u32,
    /// Failure rate above which the learning signal overrides severity.
    pub learning_fail_threshold: f64,
    /// Capacity of the retained evaluation history ring.
    pub history_capacity: usize,
}

impl DecisionPolicyConfig {
    /// Builds a config from `REFLECT_POLICY_*` environment variables, falling
    /// back to the documented defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ConfigError`] if any of those variables are set to
    /// a value that fails to parse.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            handle_threshold: parse_or("REFLECT_POLICY_HANDLE_THRESHOLD", DEFAULT_HANDLE_THRESHOLD)?,
            escalate_threshold: parse_or(
                "REFLECT_POLICY_ESCALATE_THRESHOLD",
                DEFAULT_ESCALATE_THRESHOLD,
            )?,
            min_samples: parse_or("REFLECT_POLICY_MIN_SAMPLES", DEFAULT_MIN_SAMPLES)?,
            learning_fail_threshold: parse_or(
                "REFLECT_POLICY_LEARNING_FAIL_THRESHOLD",
                DEFAULT_LEARNING_FAIL_THRESHOLD,
            )?,
            history_capacity: parse_or("REFLECT_POLICY_HISTORY_CAPACITY", DEFAULT_HISTORY_CAPACITY)?,
        })
    }
}

impl Default for DecisionPolicyConfig {
    fn default() -> Self {
        Self {
            handle_threshold: DEFAULT_HANDLE_THRESHOLD,
            escalate_threshold: DEFAULT_ESCALATE_THRESHOLD,
            min_samples: DEFAULT_MIN_SAMPLES,
            learning_fail_threshold: DEFAULT_LEARNING_FAIL_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_ordered() {
        let config = DecisionPolicyConfig::default();
        assert!(config.handle_threshold < config.escalate_threshold);
    }
}
