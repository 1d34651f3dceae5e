use crate::services::counter_sync::SyncOutcome;
use std::time::{Duration, Instant};

/// Displayed mirror of the remote counter. Owned by the UI thread.
///
/// The value is never changed locally; it only takes whatever the server
/// last reported, in the order responses arrive.
pub struct CounterState {
    value: u64,
    last_applied_seq: u64,
    interval: Duration,
    next_tick: Instant,
    pub failed_syncs: u64,
}

impl CounterState {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            value: 0,
            last_applied_seq: 0,
            interval,
            next_tick: now + interval,
            failed_syncs: 0,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn label(&self) -> String {
        self.value.to_string()
    }

    /// Apply one finished sync call. Returns true if the displayed value was overwritten.
    pub fn apply(&mut self, outcome: &SyncOutcome) -> bool {
        match &outcome.result {
            Ok(count) => {
                if outcome.seq < self.last_applied_seq {
                    log::debug!(
                        "[Counter] Applying stale response #{} after #{}",
                        outcome.seq,
                        self.last_applied_seq
                    );
                }
                self.value = *count;
                self.last_applied_seq = outcome.seq;
                true
            }
            Err(_) => {
                self.failed_syncs += 1;
                false
            }
        }
    }

    /// True once per elapsed interval; schedules the next tick from `now`
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        self.next_tick = now + self.interval;
        true
    }

    /// How long the UI may sleep before the next tick is due
    pub fn time_until_tick(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }
}
