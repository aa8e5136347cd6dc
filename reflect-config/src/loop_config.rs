//! Tunables for the reflection loop itself.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env::{parse_or, string_or};
use crate::error::ConfigResult;

/// Default interval between reflection cycles.
pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 300;
/// Default number of recent memory entries pulled into the reflection prompt.
pub const DEFAULT_MEMORY_TOP_K: usize = 10;
/// Default hourly cycle budget; `0` means unbounded.
pub const DEFAULT_MAX_CYCLES_PER_HOUR: u32 = 12;
/// Default agent name used when none is configured.
pub const DEFAULT_AGENT_NAME: &str = "reflectd";

/// Configuration for [`reflect_loop`]'s reflection loop.
///
/// [`reflect_loop`]: https://docs.rs/reflect-loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionLoopConfig {
    /// How often the loop fires a cycle absent a rate-limit skip.
    pub cycle_interval: Duration,
    /// How many recent memory entries to pull into the reflection prompt.
    pub memory_top_k: usize,
    /// Maximum cycles executed within any trailing one-hour window. `0`
    /// disables the limit.
    pub max_cycles_per_hour: u32,
    /// Name the agent uses to identify itself in prompts and escalations.
    pub agent_name: String,
}

impl ReflectionLoopConfig {
    /// Builds a config from `REFLECT_*` environment variables, falling back
    /// to the documented defaults for anything unset.
    ///
    /// Reads `REFLECT_CYCLE_INTERVAL_SECS`, `REFLECT_MEMORY_TOP_K`,
    /// `REFLECT_MAX_CYCLES_PER_HOUR`, and `REFLECT_AGENT_NAME`.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ConfigError`] if any of those variables are set to
    /// a value that fails to parse.
    pub fn from_env() -> ConfigResult<Self> {
        let cycle_interval_secs: u64 =
            parse_or("REFLECT_CYCLE_INTERVAL_SECS", DEFAULT_CYCLE_INTERVAL_SECS)?;
        let memory_top_k = parse_or("REFLECT_MEMORY_TOP_K", DEFAULT_MEMORY_TOP_K)?;
        let max_cycles_per_hour =
            parse_or("REFLECT_MAX_CYCLES_PER_HOUR", DEFAULT_MAX_CYCLES_PER_HOUR)?;
        let agent_name = string_or("REFLECT_AGENT_NAME", DEFAULT_AGENT_NAME)?;
        Ok(Self {
            cycle_interval: Duration::from_secs(cycle_interval_secs),
            memory_top_k,
            max_cycles_per_hour,
            agent_name,
        })
    }
}

impl Default for ReflectionLoopConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(DEFAULT_CYCLE_INTERVAL_SECS),
            memory_top_k: DEFAULT_MEMORY_TOP_K,
            max_cycles_per_hour: DEFAULT_MAX_CYCLES_PER_HOUR,
            agent_name: DEFAULT_AGENT_NAME.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let config = ReflectionLoopConfig::default();
        assert_eq!(config.cycle_interval, Duration::from_secs(300));
        assert_eq!(config.memory_top_k, 10);
        assert_eq!(config.max_cycles_per_hour, 12);
        assert_eq!(config.agent_name, "reflectd");
    }
}
