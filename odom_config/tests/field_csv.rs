use odom_config::{FieldPoint, load_field_points_csv, load_toml};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_points_with_strict_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("goals.csv");
    fs::write(&path, "name,x,y\ncenter,70.3,70.3\ncorner, 5.8, 5.8\n").unwrap();

    let pts = load_field_points_csv(&path).expect("load");
    assert_eq!(
        pts,
        vec![
            FieldPoint { name: "center".into(), x: 70.3, y: 70.3 },
            FieldPoint { name: "corner".into(), x: 5.8, y: 5.8 },
        ]
    );
}

#[test]
fn rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("goals.csv");
    fs::write(&path, "label,x,y\ncenter,1,2\n").unwrap();
    let err = load_field_points_csv(&path).expect_err("bad headers");
    assert!(err.to_string().contains("field CSV must have headers 'name,x,y'"));
}

#[test]
fn reports_bad_row_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("goals.csv");
    fs::write(&path, "name,x,y\na,1,2\nb,oops,3\n").unwrap();
    let err = load_field_points_csv(&path).expect_err("bad row");
    assert!(err.to_string().contains("invalid CSV row 3"), "{err}");
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_field_points_csv(&dir.path().join("nope.csv")).expect_err("missing");
    assert!(err.to_string().contains("open field CSV"));
}

#[test]
fn resolve_merges_inline_and_relative_csv() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("objects.csv"), "name,x,y\nball_2,30,40\n").unwrap();
    let toml = r#"
[starting_positions]
red = { x = 0.0, y = 0.0, heading_deg = 0.0 }
blue = { x = 0.0, y = 0.0, heading_deg = 0.0 }
skills = { x = 0.0, y = 0.0, heading_deg = 0.0 }

[field]
live_objects = [{ name = "ball_1", x = 10.0, y = 20.0 }]
live_objects_csv = "objects.csv"
"#;
    let cfg = load_toml(toml).expect("parse");
    let field = cfg.field.resolve(dir.path()).expect("resolve");
    let names: Vec<&str> = field.live_objects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["ball_1", "ball_2"]);
    assert!(field.goals.is_empty());
}

#[test]
fn resolve_rejects_duplicates_across_inline_and_csv() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("goals.csv"), "name,x,y\ncenter,1,1\n").unwrap();
    let toml = r#"
[starting_positions]
red = { x = 0.0, y = 0.0, heading_deg = 0.0 }
blue = { x = 0.0, y = 0.0, heading_deg = 0.0 }
skills = { x = 0.0, y = 0.0, heading_deg = 0.0 }

[field]
goals = [{ name = "center", x = 70.0, y = 70.0 }]
goals_csv = "goals.csv"
"#;
    let cfg = load_toml(toml).expect("parse");
    let err = cfg.field.resolve(dir.path()).expect_err("duplicate");
    assert!(err.to_string().contains("duplicate point name 'center'"));
}
