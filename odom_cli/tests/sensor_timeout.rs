use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const FAILING: &str = r#"
[starting_positions]
red = { x = 0.0, y = 0.0, heading_deg = 0.0 }
blue = { x = 0.0, y = 0.0, heading_deg = 0.0 }
skills = { x = 0.0, y = 0.0, heading_deg = 0.0 }

[update]
period_ms = 5
sensor_timeout_ms = 1

[sim]
fail_reads = true
"#;

#[test]
fn sim_timeout_bubbles_to_cli() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, FAILING).unwrap();

    let mut cmd = Command::cargo_bin("odom").unwrap();
    cmd.arg("--config").arg(&cfg).arg("self-check");
    cmd.assert().code(3).stdout(predicate::str::contains(
        "What happened: Sensor read timed out (imu.rotation)",
    ));
}

#[test]
fn run_with_every_read_failing_exits_with_sensor_code() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, FAILING).unwrap();

    Command::cargo_bin("odom")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--duration-ms", "50", "--report-ms", "0"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Sensor read timed out"));
}

#[test]
fn json_error_carries_reason_and_sensor() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, FAILING).unwrap();

    let out = Command::cargo_bin("odom")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("self-check")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let line = stdout.lines().last().expect("one JSON line");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "Timeout");
    assert_eq!(v["details"]["sensor"], "imu.rotation");
}
