//! Fixed-interval scheduler owning its own next-fire-time state.
//!
//! The caller supplies the clock instant on every poll, so the scheduler
//! itself has no ambient time dependency and no process-wide state.

use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: TimeDelta,
    next_fire: DateTime<Utc>,
}

impl IntervalScheduler {
    /// Schedule the first firing one full interval after `now`.
    pub fn new(interval_secs: u64, now: DateTime<Utc>) -> Self {
        let interval = TimeDelta::seconds(interval_secs as i64);
        Self {
            interval,
            next_fire: now + interval,
        }
    }

    /// True when the interval has elapsed; firing advances the next fire
    /// time relative to `now` so a late poll does not cause a burst of
    /// catch-up runs.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now >= self.next_fire {
            self.next_fire = now + self.interval;
            true
        } else {
            false
        }
    }

    pub fn next_fire(&self) -> DateTime<Utc> {
        self.next_fire
    }
}
