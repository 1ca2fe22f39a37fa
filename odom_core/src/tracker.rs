//! Pose state and the per-tick pipeline: raw sample → deadband → wheel deltas → arc.

use std::time::Duration;

use odom_traits::{SensorProvider, WheelId};

use crate::arc::{ArcInput, integrate};
use crate::config::{StartingPose, TrackingGeometry};
use crate::deadband::FilteredChannel;
use crate::error::OdomError;
use crate::hw_error::map_sensor_error;
use crate::pose::{CalibrationOffset, Pose};

/// One raw reading of every sensor, as returned by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub rotation_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
    /// Cumulative right encoder, degrees.
    pub right_deg: f64,
    /// Cumulative middle encoder, degrees.
    pub middle_deg: f64,
}

/// Rotation, pitch and roll, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attitude {
    pub rotation: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Per-tick snapshot for telemetry. Best-effort; not part of the pose contract.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickDiagnostics {
    pub raw: Attitude,
    pub filtered: Attitude,
    pub d_right_in: f64,
    pub d_middle_in: f64,
    pub d_theta_rad: f64,
    pub pose: Pose,
}

/// Last-seen cumulative travel of one wheel, in inches.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelTravel {
    last_in: Option<f64>,
}

impl WheelTravel {
    /// Travel since the previous reading. The first reading primes the baseline.
    pub fn delta(&mut self, current_in: f64) -> f64 {
        let d = current_in - self.last_in.unwrap_or(current_in);
        self.last_in = Some(current_in);
        d
    }

    pub fn last(&self) -> Option<f64> {
        self.last_in
    }

    fn rebase(&mut self, last_in: Option<f64>) {
        self.last_in = last_in;
    }
}

/// Read every sensor once. The first failure aborts the sample.
pub fn read_sample<S: SensorProvider + ?Sized>(
    sensors: &mut S,
    timeout: Duration,
) -> Result<Sample, OdomError> {
    let rotation_deg = sensors
        .rotation(timeout)
        .map_err(|e| map_sensor_error("imu.rotation", e.as_ref()))?;
    let pitch_deg = sensors
        .pitch(timeout)
        .map_err(|e| map_sensor_error("imu.pitch", e.as_ref()))?;
    let roll_deg = sensors
        .roll(timeout)
        .map_err(|e| map_sensor_error("imu.roll", e.as_ref()))?;
    let right_deg = sensors
        .position(WheelId::Right, timeout)
        .map_err(|e| map_sensor_error("wheel.right", e.as_ref()))?;
    let middle_deg = sensors
        .position(WheelId::Middle, timeout)
        .map_err(|e| map_sensor_error("wheel.middle", e.as_ref()))?;

    let sample = Sample {
        rotation_deg,
        pitch_deg,
        roll_deg,
        right_deg,
        middle_deg,
    };
    if !(rotation_deg.is_finite()
        && pitch_deg.is_finite()
        && roll_deg.is_finite()
        && right_deg.is_finite()
        && middle_deg.is_finite())
    {
        return Err(OdomError::SensorUnavailable {
            sensor: "sample",
            reason: format!("non-finite reading: {sample:?}"),
        });
    }
    Ok(sample)
}

/// Everything the update loop writes: the committed pose plus the filter and
/// wheel baselines it is derived from. Guarded by a single mutex.
#[derive(Debug, Clone)]
pub(crate) struct TrackerState {
    pose: Pose,
    start: StartingPose,
    offset: CalibrationOffset,
    geometry: TrackingGeometry,
    deadband_deg: f64,
    rotation: FilteredChannel,
    pitch: FilteredChannel,
    roll: FilteredChannel,
    right: WheelTravel,
    middle: WheelTravel,
}

impl TrackerState {
    pub(crate) fn new(start: StartingPose, geometry: TrackingGeometry, deadband_deg: f64) -> Self {
        let mut state = Self {
            pose: Pose::default(),
            start,
            offset: CalibrationOffset::ZERO,
            geometry,
            deadband_deg,
            rotation: FilteredChannel::new(),
            pitch: FilteredChannel::new(),
            roll: FilteredChannel::new(),
            right: WheelTravel::default(),
            middle: WheelTravel::default(),
        };
        state.rebase_to_start();
        state
    }

    // Pose and filtered heading both restart from start + offset.
    fn rebase_to_start(&mut self) {
        self.pose = self.start.with_offset(&self.offset);
        self.rotation
            .rebase(self.start.triple().heading_deg + self.offset.dheading_deg);
    }

    /// Zero the offset and restart from the starting pose. `encoders_zeroed`
    /// tells whether the wheel encoders were reset; if not, the next reading
    /// re-primes the wheel baselines instead.
    pub(crate) fn calibrate(&mut self, encoders_zeroed: bool) {
        self.offset = CalibrationOffset::ZERO;
        self.rebase_to_start();
        let baseline = encoders_zeroed.then_some(0.0);
        self.right.rebase(baseline);
        self.middle.rebase(baseline);
    }

    /// Run one sample through the pipeline and commit the new pose.
    pub(crate) fn apply(&mut self, sample: &Sample) -> TickDiagnostics {
        let eps = self.deadband_deg;
        self.rotation.update(sample.rotation_deg, eps);
        self.pitch.update(sample.pitch_deg, eps);
        self.roll.update(sample.roll_deg, eps);

        let d_right = self.right.delta(self.geometry.travel_in(sample.right_deg));
        let d_middle = self.middle.delta(self.geometry.travel_in(sample.middle_deg));

        let step = integrate(
            &self.pose,
            &ArcInput {
                filtered_heading_rad: self.rotation.total().to_radians(),
                d_right,
                d_middle,
                r_right: self.geometry.offset(WheelId::Right),
                r_middle: self.geometry.offset(WheelId::Middle),
                rotation_epsilon_rad: eps.to_radians(),
            },
        );
        self.pose = step.pose;

        TickDiagnostics {
            raw: Attitude {
                rotation: sample.rotation_deg,
                pitch: sample.pitch_deg,
                roll: sample.roll_deg,
            },
            filtered: self.filtered(),
            d_right_in: d_right,
            d_middle_in: d_middle,
            d_theta_rad: step.d_theta,
            pose: step.pose,
        }
    }

    pub(crate) fn pose(&self) -> Pose {
        self.pose
    }

    pub(crate) fn start(&self) -> StartingPose {
        self.start
    }

    pub(crate) fn offset(&self) -> CalibrationOffset {
        self.offset
    }

    pub(crate) fn geometry(&self) -> TrackingGeometry {
        self.geometry
    }

    pub(crate) fn filtered(&self) -> Attitude {
        Attitude {
            rotation: self.rotation.total(),
            pitch: self.pitch.total(),
            roll: self.roll.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoseTriple;

    fn geometry() -> TrackingGeometry {
        TrackingGeometry {
            wheel_diameter_in: 2.0,
            right_offset_in: 7.0,
            middle_offset_in: 3.5,
        }
    }

    // Encoder degrees for `inches` of travel on a 2 in wheel
    fn deg(inches: f64) -> f64 {
        inches / (2.0 * std::f64::consts::PI) * 360.0
    }

    fn state(heading_deg: f64) -> TrackerState {
        TrackerState::new(
            StartingPose::SkillsMode(PoseTriple::new(0.0, 0.0, heading_deg)),
            geometry(),
            0.01,
        )
    }

    #[test]
    fn new_state_sits_on_starting_pose() {
        let s = state(90.0);
        assert_eq!(s.pose(), Pose::from_degrees(0.0, 0.0, 90.0));
        assert_eq!(s.filtered().rotation, 90.0);
    }

    #[test]
    fn first_sample_primes_without_motion() {
        let mut s = state(0.0);
        let d = s.apply(&Sample {
            rotation_deg: 37.0,
            right_deg: 500.0,
            middle_deg: -200.0,
            ..Sample::default()
        });
        assert_eq!(s.pose(), Pose::default());
        assert_eq!(d.d_right_in, 0.0);
    }

    #[test]
    fn starting_heading_rotates_forward_axis() {
        let mut s = state(90.0);
        s.apply(&Sample::default());
        s.apply(&Sample {
            right_deg: deg(1.0),
            ..Sample::default()
        });
        let p = s.pose();
        assert!((p.x - 1.0).abs() < 1e-12, "x = {}", p.x);
        assert!(p.y.abs() < 1e-12, "y = {}", p.y);
    }

    #[test]
    fn calibrate_without_encoder_reset_reprimes() {
        let mut s = state(0.0);
        s.apply(&Sample::default());
        s.apply(&Sample {
            right_deg: deg(5.0),
            ..Sample::default()
        });
        s.calibrate(false);
        assert_eq!(s.pose(), Pose::default());
        assert_eq!(s.right.last(), None);
        // Encoders still read 5 in; the next sample only primes
        s.apply(&Sample {
            right_deg: deg(5.0),
            ..Sample::default()
        });
        assert_eq!(s.pose(), Pose::default());
    }

    #[test]
    fn calibrate_with_encoder_reset_uses_zero_baseline() {
        let mut s = state(0.0);
        s.apply(&Sample::default());
        s.calibrate(true);
        assert_eq!(s.right.last(), Some(0.0));
        assert_eq!(s.middle.last(), Some(0.0));
        s.apply(&Sample {
            right_deg: deg(2.0),
            ..Sample::default()
        });
        assert!((s.pose().y - 2.0).abs() < 1e-12);
    }
}
