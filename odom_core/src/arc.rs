//! Per-tick arc integration.
//!
//! Converts the along-arc travel of each tracking wheel into the chord it
//! represents and projects both chords into the field frame along the tick's
//! midpoint heading. The right wheel senses the forward axis, the middle wheel
//! the lateral axis.

use crate::pose::Pose;

/// Inputs for one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcInput {
    /// Filtered heading total, radians.
    pub filtered_heading_rad: f64,
    /// Right wheel travel since the previous tick, inches.
    pub d_right: f64,
    /// Middle wheel travel since the previous tick, inches.
    pub d_middle: f64,
    /// Right wheel offset from the turning center, inches.
    pub r_right: f64,
    /// Middle wheel offset from the turning center, inches.
    pub r_middle: f64,
    /// Heading changes smaller than this are integrated as straight motion.
    pub rotation_epsilon_rad: f64,
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcStep {
    pub d_theta: f64,
    pub alpha: f64,
    pub chord_right: f64,
    pub chord_middle: f64,
    pub pose: Pose,
}

/// Chord length of an arc of length `delta` travelled by a wheel mounted
/// `offset` from the turning center while the robot turned `d_theta`.
#[inline]
pub fn chord(delta: f64, d_theta: f64, offset: f64) -> f64 {
    let radius = delta / d_theta + offset;
    2.0 * radius * (d_theta / 2.0).sin()
}

/// Integrate one tick starting from `pose`.
pub fn integrate(pose: &Pose, input: &ArcInput) -> ArcStep {
    let d_theta = input.filtered_heading_rad - pose.heading_rad;

    let (alpha, chord_right, chord_middle) = if d_theta.abs() < input.rotation_epsilon_rad {
        (0.0, input.d_right, input.d_middle)
    } else {
        (
            d_theta / 2.0,
            chord(input.d_right, d_theta, input.r_right),
            chord(input.d_middle, d_theta, input.r_middle),
        )
    };

    let polar = pose.heading_rad + alpha;
    let (sin_p, cos_p) = polar.sin_cos();

    let next = Pose {
        x: pose.x + chord_right * sin_p + chord_middle * cos_p,
        y: pose.y + chord_right * cos_p - chord_middle * sin_p,
        // Commit the filtered heading itself; `h + (f - h)` can be off by an ulp
        heading_rad: input.filtered_heading_rad,
    };

    ArcStep {
        d_theta,
        alpha,
        chord_right,
        chord_middle,
        pose: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 0.01 * PI / 180.0;

    fn input(filtered: f64, d_right: f64, d_middle: f64) -> ArcInput {
        ArcInput {
            filtered_heading_rad: filtered,
            d_right,
            d_middle,
            r_right: 7.0,
            r_middle: 3.5,
            rotation_epsilon_rad: EPS,
        }
    }

    #[test]
    fn zero_input_is_identity() {
        let p = Pose::new(12.0, -4.0, 1.25);
        let step = integrate(&p, &input(1.25, 0.0, 0.0));
        assert_eq!(step.pose, p);
        assert_eq!(step.d_theta, 0.0);
    }

    #[test]
    fn straight_line_chord_equals_delta() {
        let p = Pose::new(0.0, 0.0, 0.3);
        let step = integrate(&p, &input(0.3, 2.5, -1.5));
        assert_eq!(step.chord_right, 2.5);
        assert_eq!(step.chord_middle, -1.5);
        assert_eq!(step.alpha, 0.0);
    }

    #[test]
    fn right_wheel_senses_y_at_heading_zero() {
        let step = integrate(&Pose::default(), &input(0.0, 1.0, 0.0));
        assert_eq!(step.pose.x, 0.0);
        assert_eq!(step.pose.y, 1.0);
    }

    #[test]
    fn middle_wheel_senses_x_at_heading_zero() {
        let step = integrate(&Pose::default(), &input(0.0, 0.0, 1.0));
        assert_eq!(step.pose.x, 1.0);
        assert_eq!(step.pose.y, 0.0);
    }

    #[test]
    fn committed_heading_is_the_filtered_heading() {
        let p = Pose::new(0.0, 0.0, 17f64.to_radians());
        let filtered = 50f64.to_radians();
        let step = integrate(&p, &input(filtered, 0.0, 0.0));
        assert_eq!(step.pose.heading_rad.to_bits(), filtered.to_bits());
        let again = integrate(&step.pose, &input(filtered, 0.0, 0.0));
        assert_eq!(again.d_theta, 0.0);
        assert_eq!(again.pose, step.pose);
    }

    #[test]
    fn tiny_rotation_takes_straight_branch() {
        // Below the epsilon band: no division by a near-zero d_theta
        let step = integrate(&Pose::default(), &input(1e-9, 1.0, 0.0));
        assert_eq!(step.chord_right, 1.0);
        assert!(step.pose.is_finite());
        assert_eq!(step.pose.heading_rad, 1e-9);
    }

    #[test]
    fn pure_rotation_about_center_keeps_position() {
        // A wheel at offset r travels -r * theta during a point turn
        let theta = FRAC_PI_2;
        let step = integrate(
            &Pose::default(),
            &input(theta, -7.0 * theta, -3.5 * theta),
        );
        assert!(step.pose.x.abs() < 1e-12);
        assert!(step.pose.y.abs() < 1e-12);
        assert_eq!(step.pose.heading_rad, theta);
    }

    #[test]
    fn quarter_circle_arc_lands_on_chord() {
        // Center follows a radius-10 arc while turning 90 deg clockwise
        let theta = FRAC_PI_2;
        let r = 10.0;
        let step = integrate(
            &Pose::default(),
            &input(theta, (r - 7.0) * theta, -3.5 * theta),
        );
        assert!((step.pose.x - r).abs() < 1e-9, "x = {}", step.pose.x);
        assert!((step.pose.y - r).abs() < 1e-9, "y = {}", step.pose.y);
    }
}
