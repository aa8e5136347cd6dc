//! Severity-banded decision policy with per-situation overrides and online
//! learning from outcome feedback.

#![warn(missing_docs, clippy::pedantic)]

mod decision;
mod error;
mod feedback;
mod policy;
mod situation;

/// The decision type and its kind enum.
pub use decision::{Decision, DecisionKind};
/// Error type and result alias for policy configuration.
pub use error::{PolicyError, PolicyResult};
/// Per-situation outcome counters used by the learning signal.
pub use feedback::FeedbackRecord;
/// The decision policy itself, its history entry type, and its defaults.
pub use policy::{
    DecisionPolicy, HistoryEntry, DEFAULT_HISTORY_CAPACITY, DEFAULT_LEARNING_FAIL_THRESHOLD,
    DEFAULT_MIN_SAMPLES,
};
/// The situation type policy evaluation consumes.
pub use situation::Situation;
