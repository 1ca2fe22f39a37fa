pub mod error;

use crate::error::HwError;
use odom_traits::{Chassis, Inertial, SensorError, TrackingWheels, WheelId};
use std::f64::consts::PI;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Constant-rate drive command for the simulation, expressed at the turning center.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveProfile {
    /// Forward speed (in/s).
    pub forward_ips: f64,
    /// Lateral speed, positive to the robot's right (in/s).
    pub strafe_ips: f64,
    /// Yaw rate, positive clockwise (deg/s).
    pub turn_dps: f64,
}

/// Ground-truth pose kept by the simulation, in inches and degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TruePose {
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
}

#[derive(Debug, Default)]
struct SimState {
    rotation_deg: f64,
    pitch_deg: f64,
    roll_deg: f64,
    right_deg: f64,
    middle_deg: f64,
    truth: TruePose,
    jitter_deg: f64,
    rng: u32,
    fail_reads: bool,
    reads: u64,
}

impl SimState {
    // xorshift32, uniform in [-0.5, 0.5)
    fn next_noise(&mut self) -> f64 {
        if self.jitter_deg == 0.0 {
            return 0.0;
        }
        let mut x = self.rng.max(1);
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (f64::from(x) / (f64::from(u32::MAX) + 1.0) - 0.5) * self.jitter_deg
    }
}

/// Simulated IMU plus tracking wheels.
///
/// Readings are cumulative, like the real devices. Motion is injected through a
/// [`SimHandle`], which can be cloned and moved to another thread while the
/// sensors themselves are owned by the odometry engine.
pub struct SimulatedSensors {
    state: Arc<Mutex<SimState>>,
    diameter_in: f64,
    right_offset_in: f64,
    middle_offset_in: f64,
}

/// Shared control surface for a [`SimulatedSensors`] instance.
#[derive(Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
    diameter_in: f64,
    right_offset_in: f64,
    middle_offset_in: f64,
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedSensors {
    pub fn new(diameter_in: f64, right_offset_in: f64, middle_offset_in: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                rng: 0x00C0_FFEE,
                ..SimState::default()
            })),
            diameter_in,
            right_offset_in,
            middle_offset_in,
        }
    }

    pub fn handle(&self) -> SimHandle {
        SimHandle {
            state: self.state.clone(),
            diameter_in: self.diameter_in,
            right_offset_in: self.right_offset_in,
            middle_offset_in: self.middle_offset_in,
        }
    }

    fn read<F: FnOnce(&mut SimState) -> f64>(&self, f: F) -> Result<f64, SensorError> {
        let mut s = lock(&self.state);
        s.reads = s.reads.saturating_add(1);
        if s.fail_reads {
            return Err(Box::new(HwError::Timeout));
        }
        Ok(f(&mut s))
    }
}

impl SimHandle {
    fn inches_to_deg(&self, inches: f64) -> f64 {
        inches / (self.diameter_in * PI) * 360.0
    }

    /// Move the turning center by `forward_in`/`strafe_in` along an arc while
    /// yawing by `turn_deg`. Wheel counters advance by their arc lengths.
    pub fn drive(&self, forward_in: f64, strafe_in: f64, turn_deg: f64) {
        let theta = turn_deg.to_radians();
        let mut s = lock(&self.state);

        let right_in = forward_in - self.right_offset_in * theta;
        let middle_in = strafe_in - self.middle_offset_in * theta;
        s.right_deg += self.inches_to_deg(right_in);
        s.middle_deg += self.inches_to_deg(middle_in);
        s.rotation_deg += turn_deg;

        // Chord of the arc travelled by the turning center, along the mid heading.
        let heading = s.truth.heading_deg.to_radians();
        let k = if theta.abs() < 1e-12 {
            1.0
        } else {
            2.0 * (theta / 2.0).sin() / theta
        };
        let p = heading + theta / 2.0;
        s.truth.x += k * (forward_in * p.sin() + strafe_in * p.cos());
        s.truth.y += k * (forward_in * p.cos() - strafe_in * p.sin());
        s.truth.heading_deg += turn_deg;
    }

    /// Advance the simulation by `dt` under a constant-rate profile.
    pub fn advance(&self, profile: DriveProfile, dt: Duration) {
        let secs = dt.as_secs_f64();
        self.drive(
            profile.forward_ips * secs,
            profile.strafe_ips * secs,
            profile.turn_dps * secs,
        );
    }

    pub fn set_attitude(&self, pitch_deg: f64, roll_deg: f64) {
        let mut s = lock(&self.state);
        s.pitch_deg = pitch_deg;
        s.roll_deg = roll_deg;
    }

    /// Peak-to-peak noise added to every IMU reading (not accumulated).
    pub fn set_jitter(&self, jitter_deg: f64) {
        lock(&self.state).jitter_deg = jitter_deg.max(0.0);
    }

    /// When set, every read fails with [`HwError::Timeout`].
    pub fn set_fail_reads(&self, fail: bool) {
        lock(&self.state).fail_reads = fail;
    }

    /// Move the ground truth without touching any sensor, e.g. to place
    /// the robot at its starting pose.
    pub fn place(&self, truth: TruePose) {
        lock(&self.state).truth = truth;
    }

    pub fn true_pose(&self) -> TruePose {
        lock(&self.state).truth
    }

    /// Total reads served, successful or not.
    pub fn reads(&self) -> u64 {
        lock(&self.state).reads
    }
}

impl Inertial for SimulatedSensors {
    fn rotation(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        self.read(|s| s.rotation_deg + s.next_noise())
    }

    fn pitch(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        self.read(|s| s.pitch_deg + s.next_noise())
    }

    fn roll(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        self.read(|s| s.roll_deg + s.next_noise())
    }
}

impl TrackingWheels for SimulatedSensors {
    fn position(&mut self, wheel: WheelId, _timeout: Duration) -> Result<f64, SensorError> {
        self.read(|s| match wheel {
            WheelId::Right => s.right_deg,
            WheelId::Middle => s.middle_deg,
        })
    }

    fn diameter(&self) -> f64 {
        self.diameter_in
    }

    fn offset(&self, wheel: WheelId) -> f64 {
        match wheel {
            WheelId::Right => self.right_offset_in,
            WheelId::Middle => self.middle_offset_in,
        }
    }

    fn reset(&mut self) -> Result<(), SensorError> {
        let mut s = lock(&self.state);
        if s.fail_reads {
            return Err(Box::new(HwError::Disconnected("tracking wheels".into())));
        }
        s.right_deg = 0.0;
        s.middle_deg = 0.0;
        tracing::debug!("simulated tracking wheels reset");
        Ok(())
    }
}

/// Simulated chassis handle; carries nothing but a name.
#[derive(Debug, Clone)]
pub struct SimulatedChassis {
    name: String,
}

impl SimulatedChassis {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for SimulatedChassis {
    fn default() -> Self {
        Self::new("sim-skid-steer")
    }
}

impl Chassis for SimulatedChassis {
    fn name(&self) -> &str {
        &self.name
    }
}
