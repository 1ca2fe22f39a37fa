//! Test and helper mocks for odom_core

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use odom_traits::{Chassis, Inertial, SensorError, TrackingWheels, WheelId};

use crate::tracker::Sample;

/// Provider that replays a fixed list of samples, one per tick.
///
/// A tick reads rotation, pitch, roll, right, middle in that order; the
/// script advances after the middle wheel is read. Once exhausted the last
/// sample repeats. `reset()` re-zeroes the encoders at their current reading.
pub struct ScriptedSensors {
    script: Vec<Sample>,
    cursor: usize,
    fail: Arc<AtomicBool>,
    right_bias: f64,
    middle_bias: f64,
    diameter_in: f64,
    right_offset_in: f64,
    middle_offset_in: f64,
}

impl ScriptedSensors {
    pub fn new(script: Vec<Sample>, diameter_in: f64, right_offset_in: f64, middle_offset_in: f64) -> Self {
        Self {
            script,
            cursor: 0,
            fail: Arc::new(AtomicBool::new(false)),
            right_bias: 0.0,
            middle_bias: 0.0,
            diameter_in,
            right_offset_in,
            middle_offset_in,
        }
    }

    /// Shared switch; while set, every read and reset fails.
    pub fn fail_switch(&self) -> Arc<AtomicBool> {
        self.fail.clone()
    }

    fn current(&self) -> Sample {
        if self.script.is_empty() {
            return Sample::default();
        }
        self.script[self.cursor.min(self.script.len() - 1)]
    }

    fn check(&self) -> Result<(), SensorError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(Box::new(std::io::Error::other("scripted sensor failure")));
        }
        Ok(())
    }
}

impl Inertial for ScriptedSensors {
    fn rotation(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        self.check()?;
        Ok(self.current().rotation_deg)
    }

    fn pitch(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        self.check()?;
        Ok(self.current().pitch_deg)
    }

    fn roll(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        self.check()?;
        Ok(self.current().roll_deg)
    }
}

impl TrackingWheels for ScriptedSensors {
    fn position(&mut self, wheel: WheelId, _timeout: Duration) -> Result<f64, SensorError> {
        self.check()?;
        let s = self.current();
        Ok(match wheel {
            WheelId::Right => s.right_deg - self.right_bias,
            WheelId::Middle => {
                self.cursor = self.cursor.saturating_add(1);
                s.middle_deg - self.middle_bias
            }
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
        self.check()?;
        let s = self.current();
        self.right_bias = s.right_deg;
        self.middle_bias = s.middle_deg;
        Ok(())
    }
}

/// A provider that always errors on read; useful for exercising the skip path
/// or for building an engine whose pose is only ever set by calibration.
pub struct NoopSensors;

impl Inertial for NoopSensors {
    fn rotation(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        Err(Box::new(std::io::Error::other("noop sensors")))
    }

    fn pitch(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        Err(Box::new(std::io::Error::other("noop sensors")))
    }

    fn roll(&mut self, _timeout: Duration) -> Result<f64, SensorError> {
        Err(Box::new(std::io::Error::other("noop sensors")))
    }
}

impl TrackingWheels for NoopSensors {
    fn position(&mut self, _wheel: WheelId, _timeout: Duration) -> Result<f64, SensorError> {
        Err(Box::new(std::io::Error::other("noop sensors")))
    }

    fn diameter(&self) -> f64 {
        2.75
    }

    fn offset(&self, wheel: WheelId) -> f64 {
        match wheel {
            WheelId::Right => 7.0,
            WheelId::Middle => 3.5,
        }
    }

    fn reset(&mut self) -> Result<(), SensorError> {
        Err(Box::new(std::io::Error::other("noop sensors")))
    }
}

/// Chassis placeholder used when none is supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChassis;

impl Chassis for NoopChassis {}
