//! Escalation notification, structured audit recording, and the
//! fire-and-forget action handler contract consumed by the reflection loop.

#![warn(missing_docs, clippy::pedantic)]

mod action;
mod audit;
mod error;
mod escalation;

/// The action type and its handler contract.
pub use action::{Action, ActionHandler, ActionKind};
/// The audit record type, its sink trait, and the tracing-backed default.
pub use audit::{AuditRecord, AuditSink, TracingAuditSink};
/// Error type and result alias shared by every sink.
pub use error::{SinkError, SinkResult};
/// The escalation type, its sink trait, and the fan-out and tracing-backed implementations.
pub use escalation::{Escalation, EscalationLevel, EscalationSink, FanOutEscalationSink, TracingEscalationSink};
