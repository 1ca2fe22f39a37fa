//! Maps `Box<dyn Error>` from trait boundaries to typed `OdomError`.
//!
//! The traits in `odom_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `odom_hardware::HwError` downcasting.

use crate::error::OdomError;

/// Map a trait-boundary error raised by `sensor` to a typed `OdomError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_sensor_error(sensor: &'static str, e: &(dyn std::error::Error + 'static)) -> OdomError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<odom_hardware::error::HwError>() {
            return match hw {
                odom_hardware::error::HwError::Timeout => OdomError::Timeout { sensor },
                other => OdomError::SensorUnavailable {
                    sensor,
                    reason: other.to_string(),
                },
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") || s.to_lowercase().contains("timed out") {
        OdomError::Timeout { sensor }
    } else {
        OdomError::SensorUnavailable { sensor, reason: s }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_timeout_maps_to_timeout() {
        let e: Box<dyn std::error::Error + Send + Sync> = "sensor timeout".into();
        assert_eq!(
            map_sensor_error("imu.rotation", e.as_ref()),
            OdomError::Timeout {
                sensor: "imu.rotation"
            }
        );
    }

    #[test]
    fn other_errors_map_to_unavailable() {
        let e = std::io::Error::other("bus fault");
        match map_sensor_error("wheel.right", &e) {
            OdomError::SensorUnavailable { sensor, reason } => {
                assert_eq!(sensor, "wheel.right");
                assert!(reason.contains("bus fault"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hw_timeout_downcasts() {
        let e: Box<dyn std::error::Error + Send + Sync> =
            Box::new(odom_hardware::error::HwError::Timeout);
        assert!(matches!(
            map_sensor_error("imu.roll", e.as_ref()),
            OdomError::Timeout { sensor: "imu.roll" }
        ));
    }
}
