//! Pose snapshot and calibration offset.

/// Robot pose in the field frame.
///
/// `heading_rad` accumulates without wrapping; per-tick heading deltas are
/// computed against it. Use [`Pose::heading_wrapped_deg`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Inches.
    pub x: f64,
    /// Inches.
    pub y: f64,
    /// Radians, clockwise from the field +y axis, unbounded.
    pub heading_rad: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, heading_rad: f64) -> Self {
        Self { x, y, heading_rad }
    }

    pub fn from_degrees(x: f64, y: f64, heading_deg: f64) -> Self {
        Self::new(x, y, heading_deg.to_radians())
    }

    #[inline]
    pub fn heading_deg(&self) -> f64 {
        self.heading_rad.to_degrees()
    }

    /// Heading folded into `[0, 360)` degrees.
    pub fn heading_wrapped_deg(&self) -> f64 {
        let w = self.heading_deg().rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if w >= 360.0 { 0.0 } else { w }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading_rad.is_finite()
    }
}

/// Offset added to the starting pose to form the live baseline. Zeroed on calibration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationOffset {
    pub dx: f64,
    pub dy: f64,
    pub dheading_deg: f64,
}

impl CalibrationOffset {
    pub const ZERO: Self = Self {
        dx: 0.0,
        dy: 0.0,
        dheading_deg: 0.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_heading_folds_into_range() {
        assert_eq!(Pose::from_degrees(0.0, 0.0, 0.0).heading_wrapped_deg(), 0.0);
        assert!((Pose::from_degrees(0.0, 0.0, 450.0).heading_wrapped_deg() - 90.0).abs() < 1e-9);
        assert!((Pose::from_degrees(0.0, 0.0, -90.0).heading_wrapped_deg() - 270.0).abs() < 1e-9);
        let w = Pose::new(0.0, 0.0, -1e-18).heading_wrapped_deg();
        assert!((0.0..360.0).contains(&w));
    }

    #[test]
    fn unbounded_heading_is_preserved() {
        let p = Pose::from_degrees(0.0, 0.0, 725.0);
        assert!((p.heading_deg() - 725.0).abs() < 1e-9);
    }
}
