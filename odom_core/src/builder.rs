//! Type-state builder for `Odometry` and generic `build_odometry` constructor.
//!
//! The builder enforces at compile time that the sensor provider and the
//! starting pose are provided before `build()` is available. `try_build()` is
//! always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use odom_traits::{Chassis, Clock, MonotonicClock, SensorProvider};

use crate::config::{FieldTables, LoopCfg, StartingPose, StartingPositions, StartingSide, TrackingGeometry};
use crate::error::{BuildError, Result};
use crate::mocks::NoopChassis;
use crate::odometry::Odometry;

/// Odometry over a boxed provider; what the builder produces.
pub type DynOdometry = Odometry<Box<dyn SensorProvider + Send>>;

impl DynOdometry {
    /// Start building an Odometry.
    pub fn builder() -> OdometryBuilder<Missing, Missing> {
        OdometryBuilder::default()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `DynOdometry`. All fields are validated on `build()`.
pub struct OdometryBuilder<S, P> {
    sensors: Option<Box<dyn SensorProvider + Send>>,
    start: Option<StartingPose>,
    geometry: Option<TrackingGeometry>,
    loop_cfg: Option<LoopCfg>,
    field: Option<FieldTables>,
    chassis: Option<Box<dyn Chassis + Send>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _s: PhantomData<S>,
    _p: PhantomData<P>,
}

impl Default for OdometryBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            sensors: None,
            start: None,
            geometry: None,
            loop_cfg: None,
            field: None,
            chassis: None,
            clock: None,
            _s: PhantomData,
            _p: PhantomData,
        }
    }
}

/// Validate configuration and construct an `Odometry`.
///
/// Shared by `OdometryBuilder::try_build()` and `build_odometry()`.
fn validate_and_build<S: SensorProvider>(
    sensors: S,
    start: StartingPose,
    geometry: Option<TrackingGeometry>,
    loop_cfg: LoopCfg,
    field: FieldTables,
    chassis: Option<Box<dyn Chassis + Send>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Odometry<S>> {
    let geometry = geometry.unwrap_or_else(|| TrackingGeometry::from_provider(&sensors));
    geometry
        .validate()
        .map_err(|m| eyre::Report::new(BuildError::InvalidConfig(m)))?;
    loop_cfg
        .validate()
        .map_err(|m| eyre::Report::new(BuildError::InvalidConfig(m)))?;
    let t = start.triple();
    if !(t.x.is_finite() && t.y.is_finite() && t.heading_deg.is_finite()) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "starting pose must be finite",
        )));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let chassis = chassis.unwrap_or_else(|| Box::new(NoopChassis));

    Ok(Odometry::from_parts(
        sensors, start, geometry, loop_cfg, clock, field, chassis,
    ))
}

impl<S, P> OdometryBuilder<S, P> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<DynOdometry> {
        let sensors = self
            .sensors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensors))?;
        let start = self
            .start
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStartingPose))?;

        validate_and_build(
            sensors,
            start,
            self.geometry,
            self.loop_cfg.unwrap_or_default(),
            self.field.unwrap_or_default(),
            self.chassis,
            self.clock,
        )
    }
}

/// Chainable setters that do not affect type-state.
impl<S, P> OdometryBuilder<S, P> {
    /// Override the geometry; defaults to the provider's own accessors.
    pub fn with_geometry(mut self, geometry: TrackingGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
    pub fn with_loop_cfg(mut self, cfg: LoopCfg) -> Self {
        self.loop_cfg = Some(cfg);
        self
    }
    pub fn with_field(mut self, field: FieldTables) -> Self {
        self.field = Some(field);
        self
    }
    pub fn with_chassis(mut self, chassis: impl Chassis + Send + 'static) -> Self {
        self.chassis = Some(Box::new(chassis));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<P> OdometryBuilder<Missing, P> {
    pub fn with_sensors(
        self,
        sensors: impl SensorProvider + Send + 'static,
    ) -> OdometryBuilder<Set, P> {
        OdometryBuilder {
            sensors: Some(Box::new(sensors)),
            start: self.start,
            geometry: self.geometry,
            loop_cfg: self.loop_cfg,
            field: self.field,
            chassis: self.chassis,
            clock: self.clock,
            _s: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<S> OdometryBuilder<S, Missing> {
    pub fn with_starting_pose(self, start: StartingPose) -> OdometryBuilder<S, Set> {
        OdometryBuilder {
            sensors: self.sensors,
            start: Some(start),
            geometry: self.geometry,
            loop_cfg: self.loop_cfg,
            field: self.field,
            chassis: self.chassis,
            clock: self.clock,
            _s: PhantomData,
            _p: PhantomData,
        }
    }

    /// Select the starting pose for `side` out of `table`.
    pub fn with_starting_positions(
        self,
        table: &StartingPositions,
        side: StartingSide,
    ) -> OdometryBuilder<S, Set> {
        self.with_starting_pose(table.resolve(side))
    }
}

impl OdometryBuilder<Set, Set> {
    /// Validate and build. Only available when the sensors and starting pose are set.
    pub fn build(self) -> Result<DynOdometry> {
        self.try_build()
    }
}

/// Build a statically-dispatched `Odometry` from a concrete provider.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_odometry<S>(
    sensors: S,
    start: StartingPose,
    geometry: Option<TrackingGeometry>,
    loop_cfg: LoopCfg,
    field: FieldTables,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Odometry<S>>
where
    S: SensorProvider + 'static,
{
    validate_and_build(sensors, start, geometry, loop_cfg, field, None, clock)
}
