//! The cycle summary persisted to the memory sink after every cycle.

use std::time::Duration;

use reflect_sinks::ActionKind;

/// A compact record of one completed reflection cycle.
#[derive(Debug, Clone)]
pub struct CycleRecord {
    /// The action kind the oracle decided on.
    pub action: ActionKind,
    /// Number of observations collected this cycle.
    pub observation_count: usize,
    /// Wall-clock time the cycle took to run.
    pub duration: Duration,
    /// A truncated excerpt of the action payload, suitable for a memory entry.
    pub payload_excerpt: String,
}

const EXCERPT_LIMIT: usize = 200;

impl CycleRecord {
    /// Builds a record, truncating `payload` to a fixed excerpt length.
    #[must_use]
    pub fn new(action: ActionKind, observation_count: usize, duration: Duration, payload: &str) -> Self {
        let payload_excerpt = if payload.len() > EXCERPT_LIMIT {
            let mut excerpt = payload.chars().take(EXCERPT_LIMIT).collect::<String>();
            excerpt.push('\u{2026}');
            excerpt
        } else {
            payload.to_owned()
        };
        Self {
            action,
            observation_count,
            duration,
            payload_excerpt,
        }
    }

    /// Renders the record as a one-line memory entry body.
    #[must_use]
    pub fn to_memory_text(&self) -> String {
        format!(
            "cycle action={:?} observations={} duration_ms={} payload={}",
            self.action,
            self.observation_count,
            self.duration.as_millis(),
            self.payload_excerpt
        )
    }
}
