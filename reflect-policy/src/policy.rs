//! The severity-banded decision policy with overrides and online learning.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use reflect_core::SituationId;
use tracing::debug;

use crate::decision::{Decision, DecisionKind};
use crate::error::{PolicyError, PolicyResult};
use crate::feedback::FeedbackRecord;
use crate::situation::Situation;

/// Default number of outcomes required before the learning signal applies.
pub const DEFAULT_MIN_SAMPLES: u32 = 5;
/// Default failure rate above which the learning signal escalates.
pub const DEFAULT_LEARNING_FAIL_THRESHOLD: f64 = 0.6;
/// Default number of entries retained in the evaluation history ring.
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// One recorded policy evaluation, retained for observability and review.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The situation that was evaluated.
    pub situation_id: SituationId,
    /// The decision kind that was reached.
    ///
    /// When the learning signal fires this is always [`DecisionKind::Escalate`],
    /// not the underlying severity band that would otherwise have applied.
    pub decision: DecisionKind,
    /// The human-readable reason attached to the decision.
    pub reason: String,
    /// When the evaluation ran.
    pub recorded_at: DateTime<Utc>,
}

/// Maps a situation to `{ignore, handle, escalate}`, honoring per-situation
/// overrides and a learned escalation signal ahead of static severity bands.
#[derive(Debug)]
pub struct DecisionPolicy {
    handle_threshold: u8,
    escalate_threshold: u8,
    min_samples: u32,
    learning_fail_threshold: f64,
    history_capacity: usize,
    overrides: RwLock<HashMap<SituationId, Decision>>,
    samples: RwLock<HashMap<SituationId, FeedbackRecord>>,
    history: RwLock<VecDeque<HistoryEntry>>,
}

impl DecisionPolicy {
    /// Creates a policy with the given severity thresholds and default
    /// learning parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidThresholds`] unless
    /// `0 <= handle_threshold < escalate_threshold <= 10`.
    pub fn new(handle_threshold: u8, escalate_threshold: u8) -> PolicyResult<Self> {
        if handle_threshold >= escalate_threshold || escalate_threshold > 10 {
            return Err(PolicyError::InvalidThresholds {
                handle: handle_threshold,
                escalate: escalate_threshold,
            });
        }

        Ok(Self {
            handle_threshold,
            escalate_threshold,
            min_samples: DEFAULT_MIN_SAMPLES,
            learning_fail_threshold: DEFAULT_LEARNING_FAIL_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            overrides: RwLock::new(HashMap::new()),
            samples: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
        })
    }

    /// Overrides the minimum sample count required for the learning signal.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: u32) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Overrides the failure-rate threshold required for the learning signal.
    #[must_use]
    pub fn with_learning_fail_threshold(mut self, threshold: f64) -> Self {
        self.learning_fail_threshold = threshold;
        self
    }

    /// Overrides the capacity of the evaluation history ring.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Installs or replaces a per-situation override, which always wins.
    ///
    /// # Panics
    ///
    /// Panics if the internal override map lock has been poisoned.
    pub fn set_override(&self, situation_id: SituationId, decision: Decision) {
        let mut guard = self.overrides.write().expect("policy overrides poisoned");
        guard.insert(situation_id, decision);
    }

    /// Removes a previously installed override, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal override map lock has been poisoned.
    pub fn remove_override(&self, situation_id: &SituationId) {
        let mut guard = self.overrides.write().expect("policy overrides poisoned");
        guard.remove(situation_id);
    }

    /// Evaluates a situation in the order: override, learning signal, severity
    /// band.
    ///
    /// # Panics
    ///
    /// Panics if any internal lock has been poisoned by a prior panic.
    pub fn evaluate(&self, situation: &Situation) -> Decision {
        if let Some(decision) = self
            .overrides
            .read()
            .expect("policy overrides poisoned")
            .get(situation.id())
            .cloned()
        {
            debug!(situation = %situation.id(), "policy override applied");
            self.record_history(situation.id().clone(), decision.kind(), decision.reason());
            return decision;
        }

        if let Some(record) = self
            .samples
            .read()
            .expect("policy samples poisoned")
            .get(situation.id())
            .copied()
        {
            if record.total() >= self.min_samples
                && record.failure_rate() >= self.learning_fail_threshold
            {
                let reason = format!("learned: fail_rate={:.2}", record.failure_rate());
                debug!(situation = %situation.id(), reason, "learning signal escalated");
                self.record_history(situation.id().clone(), DecisionKind::Escalate, &reason);
                return Decision::escalate(reason);
            }
        }

        let severity = situation.severity().value();
        let decision = if severity < self.handle_threshold {
            Decision::ignore(format!("severity<{}", self.handle_threshold))
        } else if severity >= self.escalate_threshold {
            Decision::escalate(format!("severity\u{2265}{}", self.escalate_threshold))
        } else {
            Decision::handle(format!(
                "{}<=severity<{}",
                self.handle_threshold, self.escalate_threshold
            ))
        };

        self.record_history(situation.id().clone(), decision.kind(), decision.reason());
        decision
    }

    /// Records an outcome for a situation, feeding the learning signal.
    ///
    /// # Panics
    ///
    /// Panics if the internal sample map lock has been poisoned.
    pub fn feedback(&self, situation_id: SituationId, decision: DecisionKind, succeeded: bool) {
        let mut guard = self.samples.write().expect("policy samples poisoned");
        guard
            .entry(situation_id)
            .or_default()
            .record(decision, succeeded);
    }

    /// Returns a copy of the retained evaluation history, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal history lock has been poisoned.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history
            .read()
            .expect("policy history poisoned")
            .iter()
            .cloned()
            .collect()
    }

    fn record_history(&self, situation_id: SituationId, decision: DecisionKind, reason: &str) {
        let mut guard = self.history.write().expect("policy history poisoned");
        guard.push_back(HistoryEntry {
            situation_id,
            decision,
            reason: reason.to_owned(),
            recorded_at: Utc::now(),
        });
        while guard.len() > self.history_capacity {
            guard.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflect_core::Severity;

    fn situation(id: &str, severity: u8) -> Situation {
        Situation::new(
            SituationId::new(id).unwrap(),
            Severity::new(severity).unwrap(),
            "test situation",
        )
    }

    #[test]
    fn rejects_invalid_thresholds() {
        let err = DecisionPolicy::new(7, 7).expect_err("equal thresholds are invalid");
        assert!(matches!(err, PolicyError::InvalidThresholds { .. }));
    }

    #[test]
    fn severity_bands_determine_default_decision() {
        let policy = DecisionPolicy::new(3, 7).unwrap();

        assert!(policy.evaluate(&situation("low", 1)).is_ignore());
        assert!(policy.evaluate(&situation("mid", 5)).is_handle());
        assert!(policy.evaluate(&situation("high", 9)).is_escalate());
    }

    #[test]
    fn override_wins_over_severity() {
        let policy = DecisionPolicy::new(3, 7).unwrap();
        let id = SituationId::new("always_ignore").unwrap();
        policy.set_override(id.clone(), Decision::ignore("override"));

        let decision = policy.evaluate(&situation("always_ignore", 9));
        assert!(decision.is_ignore());
        assert_eq!(decision.reason(), "override");
    }

    #[test]
    fn learning_signal_escalates_after_enough_failures() {
        let policy = DecisionPolicy::new(3, 7).unwrap();
        let id = SituationId::new("flaky_check").unwrap();

        for _ in 0..6 {
            policy.feedback(id.clone(), DecisionKind::Handle, false);
        }

        let decision = policy.evaluate(&situation("flaky_check", 4));
        assert!(decision.is_escalate());
        assert!(decision.reason().starts_with("learned"));
    }

    #[test]
    fn learning_signal_requires_minimum_samples() {
        let policy = DecisionPolicy::new(3, 7).unwrap();
        let id = SituationId::new("flaky_check").unwrap();

        for _ in 0..4 {
            policy.feedback(id.clone(), DecisionKind::Handle, false);
        }

        let decision = policy.evaluate(&situation("flaky_check", 4));
        assert!(decision.is_handle());
    }

    #[test]
    fn history_tracks_learned_escalation_not_severity_band() {
        let policy = DecisionPolicy::new(3, 7).unwrap();
        let id = SituationId::new("flaky_check").unwrap();

        for _ in 0..6 {
            policy.feedback(id.clone(), DecisionKind::Handle, false);
        }
        policy.evaluate(&situation("flaky_check", 4));

        let history = policy.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].decision, DecisionKind::Escalate);
    }
}
