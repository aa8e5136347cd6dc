//! The situation type the decision policy evaluates.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reflect_core::{Severity, SituationId};
use serde::{Deserialize, Serialize};

/// A normalization of an observation used as policy input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Situation {
    id: SituationId,
    severity: Severity,
    description: String,
    #[serde(default)]
    context: BTreeMap<String, String>,
    timestamp: DateTime<Utc>,
}

impl Situation {
    /// Creates a new situation observed at the current time.
    #[must_use]
    pub fn new(id: SituationId, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            id,
            severity,
            description: description.into(),
            context: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Overrides the observation timestamp; defaults to the current time.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attaches a context entry and returns the updated situation.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Returns the situation identifier.
    #[must_use]
    pub fn id(&self) -> &SituationId {
        &self.id
    }

    /// Returns the severity associated with the situation.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the situation's context map.
    #[must_use]
    pub const fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    /// Returns when the situation was observed.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
