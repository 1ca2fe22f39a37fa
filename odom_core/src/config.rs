//! Configuration types for the odometry engine.
//!
//! These are the runtime configuration structs used by `Odometry`.
//! They are separate from the TOML-deserialized config in `odom_config`.

use std::f64::consts::PI;
use std::time::Duration;

use odom_traits::{TrackingWheels, WheelId};

use crate::deadband::DEFAULT_DEADBAND_DEG;
use crate::pose::{CalibrationOffset, Pose};

/// Position triple in field units (inches, degrees).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseTriple {
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
}

impl PoseTriple {
    pub const fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self { x, y, heading_deg }
    }
}

/// Which starting position to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartingSide {
    Red,
    Blue,
    Skills,
}

/// Starting coordinates for every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartingPositions {
    pub red: PoseTriple,
    pub blue: PoseTriple,
    pub skills: PoseTriple,
}

impl StartingPositions {
    pub fn resolve(&self, side: StartingSide) -> StartingPose {
        match side {
            StartingSide::Red => StartingPose::RedSide(self.red),
            StartingSide::Blue => StartingPose::BlueSide(self.blue),
            StartingSide::Skills => StartingPose::SkillsMode(self.skills),
        }
    }
}

/// Starting pose selected once at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartingPose {
    RedSide(PoseTriple),
    BlueSide(PoseTriple),
    SkillsMode(PoseTriple),
}

impl StartingPose {
    pub fn side(&self) -> StartingSide {
        match self {
            StartingPose::RedSide(_) => StartingSide::Red,
            StartingPose::BlueSide(_) => StartingSide::Blue,
            StartingPose::SkillsMode(_) => StartingSide::Skills,
        }
    }

    pub fn triple(&self) -> PoseTriple {
        match *self {
            StartingPose::RedSide(t) | StartingPose::BlueSide(t) | StartingPose::SkillsMode(t) => t,
        }
    }

    /// Live baseline: starting triple plus `offset`.
    pub fn with_offset(&self, offset: &CalibrationOffset) -> Pose {
        let t = self.triple();
        Pose::from_degrees(
            t.x + offset.dx,
            t.y + offset.dy,
            t.heading_deg + offset.dheading_deg,
        )
    }
}

/// Tracking wheel geometry, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingGeometry {
    pub wheel_diameter_in: f64,
    pub right_offset_in: f64,
    pub middle_offset_in: f64,
}

impl TrackingGeometry {
    /// Read the geometry from the provider's accessors.
    pub fn from_provider<T: TrackingWheels + ?Sized>(wheels: &T) -> Self {
        Self {
            wheel_diameter_in: wheels.diameter(),
            right_offset_in: wheels.offset(WheelId::Right),
            middle_offset_in: wheels.offset(WheelId::Middle),
        }
    }

    /// Convert cumulative encoder degrees into inches of travel.
    #[inline]
    pub fn travel_in(&self, encoder_deg: f64) -> f64 {
        encoder_deg / 360.0 * (self.wheel_diameter_in * PI)
    }

    pub fn offset(&self, wheel: WheelId) -> f64 {
        match wheel {
            WheelId::Right => self.right_offset_in,
            WheelId::Middle => self.middle_offset_in,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !(self.wheel_diameter_in.is_finite() && self.wheel_diameter_in > 0.0) {
            return Err("wheel_diameter_in must be > 0");
        }
        if !(self.right_offset_in.is_finite() && self.middle_offset_in.is_finite()) {
            return Err("wheel offsets must be finite");
        }
        Ok(())
    }
}

/// Update loop timing and filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopCfg {
    /// Fixed tick period.
    pub period: Duration,
    /// Timeout handed to every sensor read.
    pub sensor_timeout: Duration,
    /// Deadband threshold for every angular channel, in degrees.
    pub deadband_deg: f64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(10),
            sensor_timeout: Duration::from_millis(5),
            deadband_deg: DEFAULT_DEADBAND_DEG,
        }
    }
}

impl LoopCfg {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.period.is_zero() {
            return Err("period must be > 0");
        }
        if !(self.deadband_deg.is_finite() && self.deadband_deg > 0.0) {
            return Err("deadband_deg must be > 0");
        }
        Ok(())
    }
}

/// Named field coordinate, in inches.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Auxiliary coordinate tables kept for the movement layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldTables {
    pub goals: Vec<FieldPoint>,
    pub live_objects: Vec<FieldPoint>,
    pub skills_objects: Vec<FieldPoint>,
}

impl FieldTables {
    /// Look up a goal by name.
    pub fn goal(&self, name: &str) -> Option<&FieldPoint> {
        self.goals.iter().find(|p| p.name == name)
    }

    /// Objects expected on the field for the given side.
    pub fn objects_for(&self, side: StartingSide) -> &[FieldPoint] {
        match side {
            StartingSide::Red | StartingSide::Blue => &self.live_objects,
            StartingSide::Skills => &self.skills_objects,
        }
    }
}
