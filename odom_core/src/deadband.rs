//! Deadband filtering for the cumulative angular channels.

/// Default deadband threshold in degrees.
pub const DEFAULT_DEADBAND_DEG: f64 = 0.01;

/// Difference `current - last`, forced to exactly zero when its magnitude is
/// below `threshold_deg`.
#[inline]
pub fn deadband(current: f64, last: f64, threshold_deg: f64) -> f64 {
    let delta = current - last;
    if delta.abs() < threshold_deg {
        0.0
    } else {
        delta
    }
}

/// Running sum of deadband-filtered deltas for one angular axis.
///
/// The first reading only primes the baseline. Afterwards every reading
/// replaces the baseline, whether or not its delta passed the threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilteredChannel {
    total: f64,
    last: Option<f64>,
}

impl FilteredChannel {
    pub const fn new() -> Self {
        Self {
            total: 0.0,
            last: None,
        }
    }

    /// Feed one raw reading; returns the filtered delta that was accumulated.
    pub fn update(&mut self, current: f64, threshold_deg: f64) -> f64 {
        let last = self.last.unwrap_or(current);
        let delta = deadband(current, last, threshold_deg);
        self.total += delta;
        self.last = Some(current);
        delta
    }

    /// Filtered total, in the channel's units (degrees).
    #[inline]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Last raw reading, if any.
    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    /// Overwrite the filtered total, keeping the raw baseline.
    pub fn rebase(&mut self, total: f64) {
        self.total = total;
    }
}
