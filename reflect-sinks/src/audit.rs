//! Structured audit recording for broker mutations and policy-level changes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SinkResult;

/// One audit record, emitted for every broker mutation and policy-level
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The user or subject who performed (or triggered) the action.
    pub user_id: String,
    /// Short name of the action taken, e.g. `"grant.issue"`.
    pub action: String,
    /// The resource the action applied to, e.g. a capability id.
    pub resource: String,
    /// Outcome of the action, e.g. `"granted"`, `"denied"`.
    pub result: String,
    /// Free-form structured details.
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    /// When the action occurred.
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Creates an audit record stamped with the current time.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.into(),
            resource: resource.into(),
            result: result.into(),
            details: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attaches a detail entry and returns the updated record.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Sink consulted for every audit-worthy mutation.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records the supplied audit entry. Best-effort.
    async fn record(&self, record: AuditRecord) -> SinkResult<()>;
}

/// Default audit sink: logs through `tracing`.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) -> SinkResult<()> {
        info!(
            user_id = %record.user_id,
            action = %record.action,
            resource = %record.resource,
            result = %record.result,
            details = ?record.details,
            "audit record"
        );
        Ok(())
    }
}
