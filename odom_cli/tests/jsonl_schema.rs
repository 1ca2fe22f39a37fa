use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const CFG: &str = r#"
[starting_positions]
red = { x = 36.0, y = 12.0, heading_deg = 0.0 }
blue = { x = 108.0, y = 12.0, heading_deg = 0.0 }
skills = { x = 72.0, y = 12.0, heading_deg = 90.0 }

[update]
period_ms = 5
sensor_timeout_ms = 2

[field]
live_objects = [{ name = "ball_1", x = 36.0, y = 72.0 }]

[sim]
forward_ips = 12.0
imu_jitter_deg = 0.0
"#;

fn run_json(args: &[&str]) -> Vec<serde_json::Value> {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, CFG).unwrap();
    let out = Command::cargo_bin("odom")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .args(args)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8(out.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("not JSON ({e}): {l}")))
        .collect()
}

#[test]
fn run_emits_pose_lines_then_final() {
    let lines = run_json(&["run", "--duration-ms", "300", "--report-ms", "100"]);
    let last = lines.last().expect("final line");
    assert_eq!(last["event"], "final");
    for l in &lines[..lines.len() - 1] {
        assert_eq!(l["event"], "pose");
        assert!(l["t_ms"].is_u64());
    }

    // Straight drive at heading 0: x never moves, y lags the truth
    let x = last["x"].as_f64().unwrap();
    let y = last["y"].as_f64().unwrap();
    let truth_y = last["truth"]["y"].as_f64().unwrap();
    assert!((x - 36.0).abs() < 1e-9, "x = {x}");
    assert!(y > 12.0, "y = {y}");
    assert!(y <= truth_y + 1e-6, "y = {y} truth = {truth_y}");
    assert!(last["stats"]["committed"].as_u64().unwrap() > 0);
    assert_eq!(last["heading_deg"].as_f64(), Some(0.0));
}

#[test]
fn show_config_json_has_expected_schema() {
    let lines = run_json(&["show-config"]);
    assert_eq!(lines.len(), 1);
    let v = &lines[0];
    assert_eq!(v["side"], "red");
    assert_eq!(v["start"]["x"].as_f64(), Some(36.0));
    assert_eq!(v["update"]["period_ms"].as_u64(), Some(5));
    assert!((v["update"]["rate_hz"].as_f64().unwrap() - 200.0).abs() < 1e-9);
    assert_eq!(v["geometry"]["wheel_diameter_in"].as_f64(), Some(2.75));
    assert_eq!(v["objects"][0]["name"], "ball_1");
    assert!(v["goals"].as_array().unwrap().is_empty());
}

#[test]
fn self_check_json_reports_ok() {
    let lines = run_json(&["self-check"]);
    assert_eq!(lines[0]["status"], "ok");
}
