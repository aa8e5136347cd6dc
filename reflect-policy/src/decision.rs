//! The decision type returned by policy evaluation.

use serde::{Deserialize, Serialize};

/// Disposition of a situation after policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// No further action is warranted.
    Ignore,
    /// The agent should handle the situation itself.
    Handle,
    /// A human should be notified.
    Escalate,
}

/// A policy decision paired with the reason it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    kind: DecisionKind,
    reason: String,
}

impl Decision {
    /// Builds a decision from its kind and reason.
    #[must_use]
    pub fn new(kind: DecisionKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// Shorthand for an ignore decision with the given reason.
    #[must_use]
    pub fn ignore(reason: impl Into<String>) -> Self {
        Self::new(DecisionKind::Ignore, reason)
    }

    /// Shorthand for a handle decision with the given reason.
    #[must_use]
    pub fn handle(reason: impl Into<String>) -> Self {
        Self::new(DecisionKind::Handle, reason)
    }

    /// Shorthand for an escalate decision with the given reason.
    #[must_use]
    pub fn escalate(reason: impl Into<String>) -> Self {
        Self::new(DecisionKind::Escalate, reason)
    }

    /// Returns the decision kind.
    #[must_use]
    pub const fn kind(&self) -> DecisionKind {
        self.kind
    }

    /// Returns the human-readable reason for the decision.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns `true` when the decision is [`DecisionKind::Ignore`].
    #[must_use]
    pub const fn is_ignore(&self) -> bool {
        matches!(self.kind, DecisionKind::Ignore)
    }

    /// Returns `true` when the decision is [`DecisionKind::Handle`].
    #[must_use]
    pub const fn is_handle(&self) -> bool {
        matches!(self.kind, DecisionKind::Handle)
    }

    /// Returns `true` when the decision is [`DecisionKind::Escalate`].
    #[must_use]
    pub const fn is_escalate(&self) -> bool {
        matches!(self.kind, DecisionKind::Escalate)
    }
}
