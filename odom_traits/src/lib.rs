pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// Error type crossing the sensor seam. Implementations pick their own
/// concrete error; the core maps it to a typed `OdomError`.
pub type SensorError = Box<dyn std::error::Error + Send + Sync>;

/// Tracking wheel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelId {
    /// Parallel to the drive direction; senses forward/back travel.
    Right,
    /// Perpendicular to the drive direction; senses lateral travel.
    Middle,
}

/// Inertial sensor. All readings are cumulative degrees; rotation is not
/// wrapped into a fixed range.
pub trait Inertial {
    fn rotation(&mut self, timeout: Duration) -> Result<f64, SensorError>;
    fn pitch(&mut self, timeout: Duration) -> Result<f64, SensorError>;
    fn roll(&mut self, timeout: Duration) -> Result<f64, SensorError>;
}

/// Pair of passive tracking wheels with encoders.
pub trait TrackingWheels {
    /// Cumulative encoder rotation of `wheel`, in degrees.
    fn position(&mut self, wheel: WheelId, timeout: Duration) -> Result<f64, SensorError>;
    /// Wheel diameter in inches.
    fn diameter(&self) -> f64;
    /// Perpendicular distance from the turning center to `wheel`, in inches.
    fn offset(&self, wheel: WheelId) -> f64;
    /// Zero both encoders. Only used at calibration time.
    fn reset(&mut self) -> Result<(), SensorError>;
}

impl<T: Inertial + ?Sized> Inertial for Box<T> {
    fn rotation(&mut self, timeout: Duration) -> Result<f64, SensorError> {
        (**self).rotation(timeout)
    }
    fn pitch(&mut self, timeout: Duration) -> Result<f64, SensorError> {
        (**self).pitch(timeout)
    }
    fn roll(&mut self, timeout: Duration) -> Result<f64, SensorError> {
        (**self).roll(timeout)
    }
}

impl<T: TrackingWheels + ?Sized> TrackingWheels for Box<T> {
    fn position(&mut self, wheel: WheelId, timeout: Duration) -> Result<f64, SensorError> {
        (**self).position(wheel, timeout)
    }
    fn diameter(&self) -> f64 {
        (**self).diameter()
    }
    fn offset(&self, wheel: WheelId) -> f64 {
        (**self).offset(wheel)
    }
    fn reset(&mut self) -> Result<(), SensorError> {
        (**self).reset()
    }
}

/// Everything the odometry loop samples.
pub trait SensorProvider: Inertial + TrackingWheels {}

impl<T: Inertial + TrackingWheels> SensorProvider for T {}

/// Drive chassis handle. Held by the odometry engine for future velocity
/// feedback; nothing is read from it yet.
pub trait Chassis {
    fn name(&self) -> &str {
        "chassis"
    }
}

impl<T: Chassis + ?Sized> Chassis for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }
}
