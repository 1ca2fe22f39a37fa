//! Lifecycle controller and consumer-facing pose accessors.

use std::sync::{Arc, Mutex};

use odom_traits::{Chassis, Clock, SensorProvider};

use crate::config::{FieldTables, LoopCfg, StartingPose, TrackingGeometry};
use crate::error::OdomError;
use crate::pose::{CalibrationOffset, Pose};
use crate::tracker::{Attitude, TickDiagnostics, TrackerState};
use crate::update_loop::{LoopStats, Shared, Worker, lock};

/// Odometry engine over a concrete sensor provider.
///
/// Owns the sensors, the tracker state, and (while running) the update
/// thread. Dropping it stops and joins the thread before anything else is
/// freed.
pub struct Odometry<S> {
    shared: Arc<Shared<S>>,
    worker: Option<Worker>,
    field: FieldTables,
    chassis: Box<dyn Chassis + Send>,
}

impl<S> core::fmt::Debug for Odometry<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let pose = lock(&self.shared.state).pose();
        f.debug_struct("Odometry")
            .field("pose", &pose)
            .field("running", &self.worker.is_some())
            .field("chassis", &self.chassis.name())
            .finish()
    }
}

impl<S: SensorProvider> Odometry<S> {
    pub(crate) fn from_parts(
        sensors: S,
        start: StartingPose,
        geometry: TrackingGeometry,
        cfg: LoopCfg,
        clock: Arc<dyn Clock + Send + Sync>,
        field: FieldTables,
        chassis: Box<dyn Chassis + Send>,
    ) -> Self {
        let state = TrackerState::new(start, geometry, cfg.deadband_deg);
        tracing::debug!(
            side = ?start.side(),
            x = start.triple().x,
            y = start.triple().y,
            heading = start.triple().heading_deg,
            "odometry constructed"
        );
        Self {
            shared: Arc::new(Shared::new(sensors, state, clock, cfg)),
            worker: None,
            field,
            chassis,
        }
    }

    /// Zero the calibration offset, reset the encoders, and put the pose back
    /// on the starting pose. Safe to call while the loop is running.
    pub fn calibrate(&self) {
        self.shared.calibrate();
    }

    /// Run exactly one tick on the calling thread.
    pub fn step(&self) -> Result<Pose, OdomError> {
        self.shared.tick()
    }

    /// Last tick's diagnostics, if one was published since the previous call.
    pub fn latest_diagnostics(&self) -> Option<TickDiagnostics> {
        self.shared.latest_diagnostics()
    }
}

impl<S: SensorProvider + Send + 'static> Odometry<S> {
    /// Spawn the update thread. A second call while running is a no-op.
    pub fn start(&mut self) -> Result<(), OdomError> {
        if self.worker.is_some() {
            tracing::warn!("update loop already running; start ignored");
            return Ok(());
        }
        self.worker = Some(Worker::spawn(self.shared.clone())?);
        tracing::debug!(period_ms = self.shared.cfg.period.as_millis() as u64, "update loop started");
        Ok(())
    }
}

impl<S> Odometry<S> {
    /// Signal the update thread and wait for it to exit. No-op when stopped.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            drop(worker);
            tracing::debug!("update loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// X in inches.
    pub fn get_x(&self) -> f64 {
        self.pose().x
    }

    /// Y in inches.
    pub fn get_y(&self) -> f64 {
        self.pose().y
    }

    /// Unbounded heading in degrees.
    pub fn get_heading(&self) -> f64 {
        self.pose().heading_deg()
    }

    pub fn heading_radians(&self) -> f64 {
        self.pose().heading_rad
    }

    /// Most recently committed pose, as one consistent snapshot.
    pub fn pose(&self) -> Pose {
        lock(&self.shared.state).pose()
    }

    /// Filtered rotation, pitch and roll totals in degrees.
    pub fn attitude(&self) -> Attitude {
        lock(&self.shared.state).filtered()
    }

    /// Cloneable read-only handle for other threads.
    pub fn reader(&self) -> PoseReader {
        PoseReader {
            state: self.shared.state.clone(),
        }
    }

    pub fn starting_pose(&self) -> StartingPose {
        lock(&self.shared.state).start()
    }

    pub fn calibration_offset(&self) -> CalibrationOffset {
        lock(&self.shared.state).offset()
    }

    pub fn geometry(&self) -> TrackingGeometry {
        lock(&self.shared.state).geometry()
    }

    pub fn loop_cfg(&self) -> LoopCfg {
        self.shared.cfg
    }

    /// Auxiliary field coordinates supplied at construction.
    pub fn field(&self) -> &FieldTables {
        &self.field
    }

    pub fn chassis(&self) -> &(dyn Chassis + Send) {
        self.chassis.as_ref()
    }

    pub fn stats(&self) -> LoopStats {
        self.shared.counters.snapshot()
    }

    /// Milliseconds since the last committed tick (or since construction).
    pub fn stalled_for_ms(&self) -> u64 {
        let now = self.shared.clock.ms_since(self.shared.epoch);
        now.saturating_sub(self.shared.counters.last_ok_ms())
    }
}

impl<S> Drop for Odometry<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read-only view of the committed pose, usable from any thread.
#[derive(Clone)]
pub struct PoseReader {
    state: Arc<Mutex<TrackerState>>,
}

impl core::fmt::Debug for PoseReader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoseReader").field("pose", &self.pose()).finish()
    }
}

impl PoseReader {
    pub fn pose(&self) -> Pose {
        lock(&self.state).pose()
    }

    pub fn get_x(&self) -> f64 {
        self.pose().x
    }

    pub fn get_y(&self) -> f64 {
        self.pose().y
    }

    pub fn get_heading(&self) -> f64 {
        self.pose().heading_deg()
    }
}
