//! Round clock state machine.
//!
//! Owns round identity and timing: one Open period at a time, a fixed
//! countdown, a hard lock window before expiry, and date-rollover period
//! sequencing. The clock never settles anything itself; it reports events
//! and the engine reacts.

use crate::config::RoundConfig;
use crate::types::Period;
use chrono::{DateTime, Utc};

/// What a tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Countdown decremented, betting still open.
    Tick { remaining_secs: u64 },
    /// Countdown entered the lock window; bets are rejected from here on.
    Locked { remaining_secs: u64 },
    /// Countdown reached zero; the engine must settle and open the next
    /// period.
    Expired,
    /// The elapsed gap since the last tick exceeds a full round duration
    /// (process suspension). The current round is abandoned without a draw;
    /// the engine must open a fresh period. No results are fabricated for
    /// skipped rounds.
    GapSkipped { missed_period: Period },
}

/// Single-timeline round clock.
pub struct RoundClock {
    duration_secs: u64,
    lock_window_secs: u64,
    period: Period,
    remaining_secs: u64,
    announced_lock: bool,
    last_tick: DateTime<Utc>,
}

impl RoundClock {
    pub fn new(config: &RoundConfig, now: DateTime<Utc>) -> Self {
        Self {
            duration_secs: config.duration_secs,
            lock_window_secs: config.lock_window_secs,
            period: Period::first(now.date_naive()),
            remaining_secs: config.duration_secs,
            announced_lock: false,
            last_tick: now,
        }
    }

    pub fn current_period(&self) -> Period {
        self.period
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Bets are accepted only while the countdown is above the lock window.
    pub fn betting_open(&self) -> bool {
        self.remaining_secs > self.lock_window_secs
    }

    /// Advance the countdown by one cadence step.
    pub fn tick(&mut self, now: DateTime<Utc>) -> ClockEvent {
        let gap_secs = (now - self.last_tick).num_seconds();
        self.last_tick = now;

        if gap_secs > self.duration_secs as i64 {
            return ClockEvent::GapSkipped {
                missed_period: self.period,
            };
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        if self.remaining_secs == 0 {
            return ClockEvent::Expired;
        }

        if !self.betting_open() && !self.announced_lock {
            self.announced_lock = true;
            return ClockEvent::Locked {
                remaining_secs: self.remaining_secs,
            };
        }

        ClockEvent::Tick {
            remaining_secs: self.remaining_secs,
        }
    }

    /// Open the next period with a fresh countdown. Called by the engine
    /// after settlement (or after a gap skip).
    pub fn open_next(&mut self, now: DateTime<Utc>) -> Period {
        self.period = self.period.next(now.date_naive());
        self.remaining_secs = self.duration_secs;
        self.announced_lock = false;
        self.last_tick = now;
        self.period
    }
}
