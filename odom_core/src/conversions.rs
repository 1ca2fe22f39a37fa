//! `From` implementations bridging `odom_config` types to `odom_core` types.

use std::time::Duration;

use crate::config::{
    FieldPoint, FieldTables, LoopCfg, PoseTriple, StartingPositions, StartingSide, TrackingGeometry,
};

// ── Starting pose ────────────────────────────────────────────────────────────

impl From<odom_config::PoseTriple> for PoseTriple {
    fn from(t: odom_config::PoseTriple) -> Self {
        Self::new(t.x, t.y, t.heading_deg)
    }
}

impl From<odom_config::Side> for StartingSide {
    fn from(s: odom_config::Side) -> Self {
        match s {
            odom_config::Side::Red => StartingSide::Red,
            odom_config::Side::Blue => StartingSide::Blue,
            odom_config::Side::Skills => StartingSide::Skills,
        }
    }
}

impl From<&odom_config::StartingPositions> for StartingPositions {
    fn from(c: &odom_config::StartingPositions) -> Self {
        Self {
            red: c.red.into(),
            blue: c.blue.into(),
            skills: c.skills.into(),
        }
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────────

impl From<&odom_config::Geometry> for TrackingGeometry {
    fn from(c: &odom_config::Geometry) -> Self {
        Self {
            wheel_diameter_in: c.wheel_diameter_in,
            right_offset_in: c.right_offset_in,
            middle_offset_in: c.middle_offset_in,
        }
    }
}

// ── Loop timing ──────────────────────────────────────────────────────────────

impl From<&odom_config::Config> for LoopCfg {
    fn from(c: &odom_config::Config) -> Self {
        Self {
            period: Duration::from_millis(c.update.period_ms),
            sensor_timeout: Duration::from_millis(c.update.sensor_timeout_ms),
            deadband_deg: c.filter.deadband_deg,
        }
    }
}

// ── Field tables ─────────────────────────────────────────────────────────────

impl From<&odom_config::FieldPoint> for FieldPoint {
    fn from(p: &odom_config::FieldPoint) -> Self {
        Self {
            name: p.name.clone(),
            x: p.x,
            y: p.y,
        }
    }
}

fn points(v: &[odom_config::FieldPoint]) -> Vec<FieldPoint> {
    v.iter().map(FieldPoint::from).collect()
}

impl From<&odom_config::ResolvedField> for FieldTables {
    fn from(f: &odom_config::ResolvedField) -> Self {
        Self {
            goals: points(&f.goals),
            live_objects: points(&f.live_objects),
            skills_objects: points(&f.skills_objects),
        }
    }
}
