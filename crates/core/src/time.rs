use chrono::{DateTime, Utc};
use std::time::Duration;

/// Wall-clock source, fixed in tests so persisted timestamps are deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

//
// ─── COOPERATIVE TIMERS ────────────────────────────────────────────────────────
//

/// Interval of the playback position poll.
pub const POSITION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Interval of the per-question countdown.
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// A cancellable repeating timer driven by explicit elapsed time.
///
/// Nothing runs in the background: the owner feeds elapsed time with
/// [`PeriodicTimer::advance`] and drains due ticks with [`PeriodicTimer::take_tick`].
/// Arming always restarts the period, so a timer can never be armed twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTimer {
    period: Duration,
    elapsed: Duration,
    armed: bool,
}

impl PeriodicTimer {
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            elapsed: Duration::ZERO,
            armed: false,
        }
    }

    /// Cancel any pending period and start a fresh one.
    pub fn arm(&mut self) {
        self.cancel();
        self.armed = true;
    }

    /// Stop the timer. Safe to call when already stopped.
    pub fn cancel(&mut self) {
        self.armed = false;
        self.elapsed = Duration::ZERO;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left until the next tick, or `None` while disarmed.
    #[must_use]
    pub fn until_due(&self) -> Option<Duration> {
        self.armed
            .then(|| self.period.saturating_sub(self.elapsed))
    }

    pub fn advance(&mut self, delta: Duration) {
        if self.armed {
            self.elapsed = self.elapsed.saturating_add(delta);
        }
    }

    /// Consume one due tick, if any.
    pub fn take_tick(&mut self) -> bool {
        if self.armed && !self.period.is_zero() && self.elapsed >= self.period {
            self.elapsed -= self.period;
            true
        } else {
            false
        }
    }
}
