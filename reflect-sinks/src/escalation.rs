//! Escalation notifications dispatched to human-facing sinks.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{SinkError, SinkResult};

/// Severity of an escalation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationLevel {
    /// Informational notice, no action expected.
    Info,
    /// Something worth a human's attention soon.
    Warning,
    /// Something requiring prompt human attention.
    Critical,
}

/// A notification dispatched to a human-facing sink when a situation
/// warrants attention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Escalation {
    /// Severity of the escalation.
    pub level: EscalationLevel,
    /// Short title, typically `"Situation: <situation_id>"`.
    pub title: String,
    /// Full escalation message.
    pub message: String,
    /// The agent or subsystem that raised the escalation.
    pub source: String,
    /// Optional underlying error text, when the escalation was caused by one.
    pub error: Option<String>,
}

impl Escalation {
    /// Creates a new escalation with no attached error.
    #[must_use]
    pub fn new(
        level: EscalationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            source: source.into(),
            error: None,
        }
    }

    /// Attaches an underlying error description.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Notification fan-out target for escalated situations.
#[async_trait]
pub trait EscalationSink: Send + Sync {
    /// Delivers the escalation. Best-effort: failures are logged by callers,
    /// never retried by the sink itself.
    async fn notify(&self, escalation: Escalation) -> SinkResult<()>;
}

/// Default escalation sink: logs through `tracing`.
#[derive(Debug, Default)]
pub struct TracingEscalationSink;

#[async_trait]
impl EscalationSink for TracingEscalationSink {
    async fn notify(&self, escalation: Escalation) -> SinkResult<()> {
        match escalation.level {
            EscalationLevel::Info => {
                info!(title = %escalation.title, source = %escalation.source, "escalation");
            }
            EscalationLevel::Warning | EscalationLevel::Critical => {
                warn!(
                    level = ?escalation.level,
                    title = %escalation.title,
                    message = %escalation.message,
                    source = %escalation.source,
                    error = escalation.error.as_deref(),
                    "escalation"
                );
            }
        }
        Ok(())
    }
}

/// Fans a single escalation out to every child sink concurrently.
///
/// Every child is attempted regardless of earlier failures; the last error
/// encountered (if any) is returned to the caller once all deliveries
/// complete.
pub struct FanOutEscalationSink {
    children: Vec<Arc<dyn EscalationSink>>,
}

impl FanOutEscalationSink {
    /// Creates a fan-out sink from the supplied children.
    #[must_use]
    pub fn new<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn EscalationSink>>,
    {
        Self {
            children: children.into_iter().collect(),
        }
    }

    /// Adds a child sink.
    pub fn push(&mut self, sink: Arc<dyn EscalationSink>) {
        self.children.push(sink);
    }
}

#[async_trait]
impl EscalationSink for FanOutEscalationSink {
    async fn notify(&self, escalation: Escalation) -> SinkResult<()> {
        let attempts = self
            .children
            .iter()
            .map(|child| {
                let escalation = escalation.clone();
                let child = Arc::clone(child);
                async move { child.notify(escalation).await }
            })
            .collect::<Vec<_>>();

        let results = join_all(attempts).await;
        let mut last_error: Option<SinkError> = None;
        for result in results {
            if let Err(err) = result {
                last_error = Some(err);
            }
        }

        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
