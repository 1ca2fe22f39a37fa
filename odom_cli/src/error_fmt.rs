//! Human-readable error descriptions and structured JSON error formatting.

use odom_core::error::{BuildError, OdomError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensors => {
                "What happened: No sensor provider was given to the odometry engine.\nLikely causes: The IMU or tracking wheels failed to initialize or were not wired into the builder.\nHow to fix: Ensure the provider is created successfully and passed via with_sensors(...).".to_string()
            }
            BuildError::MissingStartingPose => {
                "What happened: No starting pose was selected.\nLikely causes: The builder was not given a starting position table and side.\nHow to fix: Fill in [starting_positions] and pick a side with [start].side or --side.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/odom_config.toml for a sample."
            ),
        };
    }

    if let Some(oe) = err.downcast_ref::<OdomError>() {
        return match oe {
            OdomError::Timeout { sensor } => format!(
                "What happened: Sensor read timed out ({sensor}).\nLikely causes: Device unplugged, wrong port, or timeout too low.\nHow to fix: Check the IMU and encoder cables, and consider raising update.sensor_timeout_ms in the config."
            ),
            OdomError::SensorUnavailable { sensor, reason } => format!(
                "What happened: Sensor unavailable ({sensor}: {reason}).\nLikely causes: Device disconnected or not initialized.\nHow to fix: Check wiring and power, then rerun."
            ),
            OdomError::Config(msg) if msg.contains("must have headers") => {
                format!("Invalid headers in field CSV ({msg}). Expected 'name,x,y'.")
            }
            OdomError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing or out-of-range values in the TOML, or a malformed field CSV.\nHow to fix: Edit the config file and try again."
            ),
            OdomError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or parsing
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass an existing file via --config. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for sensor faults, 4 for configuration, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(oe) = err.downcast_ref::<OdomError>() {
        if oe.is_sensor_fault() {
            return 3;
        }
        if matches!(oe, OdomError::Config(_)) {
            return 4;
        }
    }
    if let Some(BuildError::InvalidConfig(_)) = err.downcast_ref::<BuildError>() {
        return 4;
    }
    1
}

/// Stable short name for the error kind, used as the JSON "reason".
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(oe) = err.downcast_ref::<OdomError>() {
        return match oe {
            OdomError::SensorUnavailable { .. } => "SensorUnavailable",
            OdomError::Timeout { .. } => "Timeout",
            OdomError::Config(_) => "Config",
            OdomError::State(_) => "State",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(OdomError::Timeout { sensor } | OdomError::SensorUnavailable { sensor, .. }) =
        err.downcast_ref::<OdomError>()
    {
        obj["details"] = json!({ "sensor": sensor });
    }
    obj.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_sensor_exit_code() {
        let err = eyre::Report::new(OdomError::Timeout {
            sensor: "imu.rotation",
        });
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("Sensor read timed out"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Timeout");
        assert_eq!(v["details"]["sensor"], "imu.rotation");
    }

    #[test]
    fn config_errors_exit_with_four() {
        let err = eyre::Report::new(OdomError::Config("update.period_ms must be > 0".into()));
        assert_eq!(exit_code_for_error(&err), 4);
        let err = eyre::Report::new(BuildError::InvalidConfig("period must be > 0"));
        assert_eq!(exit_code_for_error(&err), 4);
    }

    #[test]
    fn untyped_errors_are_generic() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert_eq!(reason_name(&err), "Error");
        assert!(humanize(&err).starts_with("Something went wrong."));
    }
}
