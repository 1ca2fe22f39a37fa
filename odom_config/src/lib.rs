#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and field-table parsing for the odometry engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Field coordinate CSV loader enforces headers and rejects non-finite
//!   or duplicate entries.
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A pose triple as written in the config, in inches and degrees.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PoseTriple {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees. Also accepts alias "head".
    #[serde(alias = "head")]
    pub heading_deg: f64,
}

impl PoseTriple {
    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading_deg.is_finite()
    }
}

/// Side the robot starts on. Unknown strings are rejected at parse time.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Red,
    Blue,
    Skills,
}

/// Starting coordinates for every side, one triple each.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct StartingPositions {
    pub red: PoseTriple,
    pub blue: PoseTriple,
    pub skills: PoseTriple,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct StartCfg {
    pub side: Side,
}

/// Tracking wheel geometry. When absent the provider's own accessors are used.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Geometry {
    pub wheel_diameter_in: f64,
    /// Perpendicular distance from the turning center to the right wheel.
    pub right_offset_in: f64,
    /// Perpendicular distance from the turning center to the middle wheel.
    pub middle_offset_in: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            wheel_diameter_in: 2.75,
            right_offset_in: 7.0,
            middle_offset_in: 3.5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpdateCfg {
    /// Fixed tick period of the update loop (ms).
    pub period_ms: u64,
    /// Per-read sensor timeout (ms). Also accepts alias "sensor_ms".
    #[serde(alias = "sensor_ms")]
    pub sensor_timeout_ms: u64,
}

impl Default for UpdateCfg {
    fn default() -> Self {
        Self {
            period_ms: 10,
            sensor_timeout_ms: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Angular deltas smaller than this (degrees) are treated as zero.
    pub deadband_deg: f64,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self { deadband_deg: 0.01 }
    }
}

/// Named field coordinate, in inches.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FieldPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Auxiliary coordinate tables. Stored by the engine for the scripted
/// movement layer; the core itself never reads them.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FieldCfg {
    pub goals: Vec<FieldPoint>,
    pub live_objects: Vec<FieldPoint>,
    pub skills_objects: Vec<FieldPoint>,
    /// Optional CSV files (headers `name,x,y`) appended to the inline tables.
    /// Relative paths resolve against the config file's directory.
    pub goals_csv: Option<PathBuf>,
    pub live_objects_csv: Option<PathBuf>,
    pub skills_objects_csv: Option<PathBuf>,
}

/// Field tables after inline entries and CSV files have been merged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResolvedField {
    pub goals: Vec<FieldPoint>,
    pub live_objects: Vec<FieldPoint>,
    pub skills_objects: Vec<FieldPoint>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Drive profile for the simulated sensor provider.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    /// Forward speed of the turning center (in/s).
    pub forward_ips: f64,
    /// Lateral speed of the turning center (in/s).
    pub strafe_ips: f64,
    /// Yaw rate (deg/s).
    pub turn_dps: f64,
    /// Peak-to-peak jitter added to the IMU channels (deg).
    pub imu_jitter_deg: f64,
    /// Make every sensor read fail with a timeout.
    pub fail_reads: bool,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            forward_ips: 12.0,
            strafe_ips: 0.0,
            turn_dps: 0.0,
            imu_jitter_deg: 0.0,
            fail_reads: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub starting_positions: StartingPositions,
    #[serde(default)]
    pub start: StartCfg,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub update: UpdateCfg,
    #[serde(default)]
    pub filter: FilterCfg,
    #[serde(default)]
    pub field: FieldCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub sim: SimCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl StartingPositions {
    pub fn for_side(&self, side: Side) -> PoseTriple {
        match side {
            Side::Red => self.red,
            Side::Blue => self.blue,
            Side::Skills => self.skills,
        }
    }
}

/// Load a named point table from CSV.
///
/// Expected headers:
/// name,x,y
///
/// Example:
/// name,x,y
/// center_goal,70.3,70.3
pub fn load_field_points_csv(path: &Path) -> eyre::Result<Vec<FieldPoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open field CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["name", "x", "y"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "field CSV must have headers 'name,x,y', got: {}",
            actual.join(",")
        );
    }

    let mut points = Vec::new();
    for (idx, rec) in rdr.deserialize::<FieldPoint>().enumerate() {
        match rec {
            Ok(p) => {
                if !(p.x.is_finite() && p.y.is_finite()) {
                    eyre::bail!("field CSV row {}: coordinates must be finite", idx + 2);
                }
                points.push(p);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(points)
}

fn check_points(table: &str, points: &[FieldPoint]) -> eyre::Result<()> {
    let mut seen = HashSet::new();
    for p in points {
        if p.name.trim().is_empty() {
            eyre::bail!("field.{table}: point names must not be empty");
        }
        if !(p.x.is_finite() && p.y.is_finite()) {
            eyre::bail!("field.{table}: point '{}' has non-finite coordinates", p.name);
        }
        if !seen.insert(p.name.as_str()) {
            eyre::bail!("field.{table}: duplicate point name '{}'", p.name);
        }
    }
    Ok(())
}

fn merge_table(
    table: &str,
    inline: &[FieldPoint],
    csv: Option<&PathBuf>,
    base_dir: &Path,
) -> eyre::Result<Vec<FieldPoint>> {
    let mut out = inline.to_vec();
    if let Some(p) = csv {
        let path = if p.is_relative() {
            base_dir.join(p)
        } else {
            p.clone()
        };
        out.extend(load_field_points_csv(&path)?);
    }
    check_points(table, &out)?;
    Ok(out)
}

impl FieldCfg {
    /// Merge the inline tables with any configured CSV files.
    pub fn resolve(&self, base_dir: &Path) -> eyre::Result<ResolvedField> {
        Ok(ResolvedField {
            goals: merge_table("goals", &self.goals, self.goals_csv.as_ref(), base_dir)?,
            live_objects: merge_table(
                "live_objects",
                &self.live_objects,
                self.live_objects_csv.as_ref(),
                base_dir,
            )?,
            skills_objects: merge_table(
                "skills_objects",
                &self.skills_objects,
                self.skills_objects_csv.as_ref(),
                base_dir,
            )?,
        })
    }
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Starting positions
        for (name, p) in [
            ("red", self.starting_positions.red),
            ("blue", self.starting_positions.blue),
            ("skills", self.starting_positions.skills),
        ] {
            if !p.is_finite() {
                eyre::bail!("starting_positions.{name} must be finite");
            }
        }

        // Geometry
        if let Some(g) = &self.geometry {
            if !(g.wheel_diameter_in.is_finite() && g.wheel_diameter_in > 0.0) {
                eyre::bail!("geometry.wheel_diameter_in must be > 0");
            }
            if !g.right_offset_in.is_finite() {
                eyre::bail!("geometry.right_offset_in must be finite");
            }
            if !g.middle_offset_in.is_finite() {
                eyre::bail!("geometry.middle_offset_in must be finite");
            }
        }

        // Update loop
        if self.update.period_ms == 0 {
            eyre::bail!("update.period_ms must be > 0");
        }
        if self.update.period_ms > 1000 {
            eyre::bail!("update.period_ms is unreasonably large (>1s)");
        }
        if self.update.sensor_timeout_ms == 0 {
            eyre::bail!("update.sensor_timeout_ms must be >= 1");
        }

        // Filter
        if !(self.filter.deadband_deg > 0.0 && self.filter.deadband_deg <= 1.0) {
            eyre::bail!("filter.deadband_deg must be in (0.0, 1.0]");
        }

        // Field tables (inline part; CSV files are checked on resolve)
        check_points("goals", &self.field.goals)?;
        check_points("live_objects", &self.field.live_objects)?;
        check_points("skills_objects", &self.field.skills_objects)?;

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Sim
        let sim = &self.sim;
        if !(sim.forward_ips.is_finite() && sim.strafe_ips.is_finite() && sim.turn_dps.is_finite())
        {
            eyre::bail!("sim speeds must be finite");
        }
        if !(sim.imu_jitter_deg.is_finite() && sim.imu_jitter_deg >= 0.0) {
            eyre::bail!("sim.imu_jitter_deg must be >= 0");
        }

        Ok(())
    }
}
