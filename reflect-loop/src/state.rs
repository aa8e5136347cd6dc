//! Internal lifecycle and rate-limit bookkeeping for the reflection loop.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;

/// Mutable state shared between the loop handle and its background worker.
///
/// All mutations go through `tokio::sync::Mutex` since bookkeeping happens
/// inside async code; `is_running`/`cycle_count` take the lock briefly.
pub(crate) struct LoopState {
    running: bool,
    cycles: u64,
    last_cycle: Option<DateTime<Utc>>,
    recent_cycles: Vec<DateTime<Utc>>,
}

impl LoopState {
    pub(crate) fn new() -> Mutex<Self> {
        Mutex::new(Self {
            running: false,
            cycles: 0,
            last_cycle: None,
            recent_cycles: Vec::new(),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub(crate) fn cycle_count(&self) -> u64 {
        self.cycles
    }

    pub(crate) fn last_cycle(&self) -> Option<DateTime<Utc>> {
        self.last_cycle
    }

    /// Prunes `recent_cycles` to the trailing one-hour window and returns
    /// how many cycles remain in it. Does not mutate `cycles` or
    /// `last_cycle`.
    pub(crate) fn prune_and_count_recent(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - ChronoDuration::hours(1);
        self.recent_cycles.retain(|timestamp| *timestamp > cutoff);
        self.recent_cycles.len()
    }

    /// Records a completed cycle: increments the counter, appends `now` to
    /// the rate-limit window, and stamps `last_cycle`.
    pub(crate) fn record_cycle(&mut self, now: DateTime<Utc>) {
        self.cycles += 1;
        self.recent_cycles.push(now);
        self.last_cycle = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prune_drops_entries_older_than_one_hour() {
        let state_lock = LoopState::new();
        let mut state = state_lock.lock().await;

        let now = Utc::now();
        state.recent_cycles.push(now - ChronoDuration::hours(2));
        state.recent_cycles.push(now - ChronoDuration::minutes(10));

        assert_eq!(state.prune_and_count_recent(now), 1);
    }

    #[tokio::test]
    async fn record_cycle_increments_and_stamps() {
        let state_lock = LoopState::new();
        let mut state = state_lock.lock().await;

        let now = Utc::now();
        state.record_cycle(now);

        assert_eq!(state.cycle_count(), 1);
        assert_eq!(state.last_cycle(), Some(now));
    }
}
