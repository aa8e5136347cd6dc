//! The observation type produced by observers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reflect_core::{ObserverId, Severity, SituationId};
use serde::{Deserialize, Serialize};

/// A timestamped event produced by an observer.
///
/// Immutable after production; the reflection loop normalizes this into a
/// [`Situation`](https://docs.rs/reflect-policy) before handing it to the
/// decision policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    monitor_id: ObserverId,
    situation_id: SituationId,
    severity: Severity,
    message: String,
    #[serde(default)]
    details: BTreeMap<String, String>,
    observed_at: DateTime<Utc>,
}

impl Observation {
    /// Creates an observation observed at the current time.
    #[must_use]
    pub fn new(
        monitor_id: ObserverId,
        situation_id: SituationId,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            monitor_id,
            situation_id,
            severity,
            message: message.into(),
            details: BTreeMap::new(),
            observed_at: Utc::now(),
        }
    }

    /// Attaches a detail entry and returns the updated observation.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns the id of the observer that produced this observation.
    #[must_use]
    pub fn monitor_id(&self) -> &ObserverId {
        &self.monitor_id
    }

    /// Returns the situation id this observation normalizes to.
    #[must_use]
    pub fn situation_id(&self) -> &SituationId {
        &self.situation_id
    }

    /// Returns the observation's severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the observation's detail map.
    #[must_use]
    pub const fn details(&self) -> &BTreeMap<String, String> {
        &self.details
    }

    /// Returns when the observation was produced.
    #[must_use]
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
