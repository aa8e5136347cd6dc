//! The action type parsed from the oracle's reply, and its handler contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// The kind of action the oracle decided on for this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Nothing to do this cycle.
    Idle,
    /// Think further before acting; the default for unparseable replies.
    Reflect,
    /// Pursue a concrete goal.
    Goal,
    /// A human should be notified.
    Escalate,
}

/// An action produced by parsing the oracle's single-line reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    kind: ActionKind,
    description: String,
    payload: String,
    decided_at: DateTime<Utc>,
}

impl Action {
    /// Creates an action decided at the current time.
    #[must_use]
    pub fn new(kind: ActionKind, description: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            payload: payload.into(),
            decided_at: Utc::now(),
        }
    }

    /// Returns the action kind.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Returns the action's description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the action's payload, the trimmed remainder of the oracle reply.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns when the action was decided.
    #[must_use]
    pub const fn decided_at(&self) -> DateTime<Utc> {
        self.decided_at
    }

    /// Returns `true` unless the action kind is [`ActionKind::Idle`].
    #[must_use]
    pub const fn requires_handling(&self) -> bool {
        !matches!(self.kind, ActionKind::Idle)
    }
}

/// Invoked fire-and-forget by the reflection loop for any non-idle action.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Handles the supplied action. The loop never awaits this call inline;
    /// it is spawned and its `JoinHandle` discarded so a handler panic
    /// cannot take down the worker.
    async fn handle(&self, cancellation: CancellationToken, action: Action);
}
