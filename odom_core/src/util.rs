//! Tick pacing helpers for odom_core.

use std::time::{Duration, Instant};

use odom_traits::Clock;

/// Rate in Hz for a tick period.
#[inline]
pub fn rate_hz(period: Duration) -> f64 {
    if period.is_zero() {
        return 0.0;
    }
    1.0 / period.as_secs_f64()
}

/// Absolute-deadline pacer.
///
/// Deadlines advance by exactly one period per tick, so time spent inside a
/// tick does not accumulate as drift. When a tick overruns its deadline the
/// schedule re-anchors to the current time instead of firing a burst of
/// catch-up ticks.
#[derive(Debug, Clone)]
pub struct Pacer {
    next: Instant,
    period: Duration,
}

impl Pacer {
    pub fn new(start: Instant, period: Duration) -> Self {
        Self {
            next: start + period,
            period,
        }
    }

    /// Next deadline the pacer will wait for.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Sleep until the next deadline. Returns `false` if the deadline had
    /// already passed (an overrun), `true` otherwise.
    pub fn wait<C: Clock + ?Sized>(&mut self, clock: &C) -> bool {
        let now = clock.now();
        if now > self.next {
            self.next = now + self.period;
            return false;
        }
        clock.sleep_until(self.next);
        self.next += self.period;
        true
    }
}
