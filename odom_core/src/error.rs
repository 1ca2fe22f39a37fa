use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OdomError {
    #[error("sensor unavailable: {sensor}: {reason}")]
    SensorUnavailable { sensor: &'static str, reason: String },
    #[error("timeout waiting for {sensor}")]
    Timeout { sensor: &'static str },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

impl OdomError {
    /// True for faults raised by a sensor read; these skip a tick and are never fatal.
    pub fn is_sensor_fault(&self) -> bool {
        matches!(
            self,
            OdomError::SensorUnavailable { .. } | OdomError::Timeout { .. }
        )
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sensor provider")]
    MissingSensors,
    #[error("missing starting pose")]
    MissingStartingPose,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
