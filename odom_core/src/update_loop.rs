//! Background update loop.
//!
//! A [`Worker`] owns one thread that ticks the shared tracker at a fixed
//! period until it is dropped. Each tick locks the sensors, reads a full
//! sample, then locks the tracker state just long enough to integrate and
//! commit. Calibration takes the same two locks in the same order.
//!
//! The thread is joined when the `Worker` is dropped, so no pose write can
//! outlive it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel as xch;
use odom_traits::{Clock, SensorProvider};

use crate::config::LoopCfg;
use crate::error::OdomError;
use crate::pose::Pose;
use crate::tracker::{TickDiagnostics, TrackerState, read_sample};
use crate::util::Pacer;

pub(crate) fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot of the loop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks that integrated and committed a pose.
    pub committed: u64,
    /// Ticks skipped because a sensor read failed.
    pub skipped: u64,
    /// Ticks that started after their deadline had already passed.
    pub overruns: u64,
}

#[derive(Debug, Default)]
pub(crate) struct LoopCounters {
    committed: AtomicU64,
    skipped: AtomicU64,
    overruns: AtomicU64,
    last_ok_ms: AtomicU64,
    failing: AtomicBool,
}

impl LoopCounters {
    pub(crate) fn snapshot(&self) -> LoopStats {
        LoopStats {
            committed: self.committed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn last_ok_ms(&self) -> u64 {
        self.last_ok_ms.load(Ordering::Relaxed)
    }
}

/// State shared between the owner, its readers, and the worker thread.
pub(crate) struct Shared<S> {
    pub(crate) state: Arc<Mutex<TrackerState>>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) cfg: LoopCfg,
    pub(crate) counters: LoopCounters,
    diag_tx: xch::Sender<TickDiagnostics>,
    diag_rx: xch::Receiver<TickDiagnostics>,
    pub(crate) sensors: Mutex<S>,
}

impl<S: SensorProvider> Shared<S> {
    pub(crate) fn new(
        sensors: S,
        state: TrackerState,
        clock: Arc<dyn Clock + Send + Sync>,
        cfg: LoopCfg,
    ) -> Self {
        let (diag_tx, diag_rx) = xch::bounded(1);
        let epoch = clock.now();
        Self {
            state: Arc::new(Mutex::new(state)),
            clock,
            epoch,
            cfg,
            counters: LoopCounters::default(),
            diag_tx,
            diag_rx,
            sensors: Mutex::new(sensors),
        }
    }

    /// One full tick. A failed read leaves the state untouched.
    pub(crate) fn tick(&self) -> Result<Pose, OdomError> {
        let mut sensors = lock(&self.sensors);
        let sample = match read_sample(&mut *sensors, self.cfg.sensor_timeout) {
            Ok(s) => s,
            Err(e) => {
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                if self.counters.failing.swap(true, Ordering::Relaxed) {
                    tracing::debug!(error = %e, "sensor read failed; tick skipped");
                } else {
                    tracing::warn!(error = %e, "sensor read failed; holding pose");
                }
                return Err(e);
            }
        };

        let diag = lock(&self.state).apply(&sample);
        drop(sensors);

        self.counters.committed.fetch_add(1, Ordering::Relaxed);
        self.counters
            .last_ok_ms
            .store(self.clock.ms_since(self.epoch), Ordering::Relaxed);
        if self.counters.failing.swap(false, Ordering::Relaxed) {
            tracing::info!("sensor reads recovered");
        }

        tracing::trace!(
            rotation = diag.raw.rotation,
            pitch = diag.raw.pitch,
            roll = diag.raw.roll,
            filtered_rotation = diag.filtered.rotation,
            filtered_pitch = diag.filtered.pitch,
            filtered_roll = diag.filtered.roll,
            d_right = diag.d_right_in,
            d_middle = diag.d_middle_in,
            x = diag.pose.x,
            y = diag.pose.y,
            heading = diag.pose.heading_deg(),
            "tick"
        );
        self.publish(diag);
        Ok(diag.pose)
    }

    /// Zero the offset, reset the encoders, and restart from the starting pose.
    pub(crate) fn calibrate(&self) {
        let mut sensors = lock(&self.sensors);
        let zeroed = match sensors.reset() {
            Ok(()) => true,
            Err(e) => {
                let e = crate::hw_error::map_sensor_error("wheel.reset", e.as_ref());
                tracing::warn!(error = %e, "encoder reset failed; re-priming wheel baselines");
                false
            }
        };
        let mut state = lock(&self.state);
        state.calibrate(zeroed);
        let pose = state.pose();
        drop(state);
        drop(sensors);
        tracing::debug!(x = pose.x, y = pose.y, heading = pose.heading_deg(), "calibrated");
    }

    // Latest-value semantics: a stale snapshot is replaced, never queued behind.
    fn publish(&self, diag: TickDiagnostics) {
        if let Err(xch::TrySendError::Full(diag)) = self.diag_tx.try_send(diag) {
            let _ = self.diag_rx.try_recv();
            let _ = self.diag_tx.try_send(diag);
        }
    }

    pub(crate) fn latest_diagnostics(&self) -> Option<TickDiagnostics> {
        self.diag_rx.try_iter().last()
    }

    pub(crate) fn record_overrun(&self) {
        let n = self.counters.overruns.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(overruns = n, "update tick overran its deadline");
    }
}

/// Handle to a running update thread. Dropping it stops and joins the thread.
pub(crate) struct Worker {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn<S>(shared: Arc<Shared<S>>) -> Result<Self, OdomError>
    where
        S: SensorProvider + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = thread::Builder::new()
            .name("odom-update".into())
            .spawn(move || {
                let clock = shared.clock.clone();
                let mut pacer = Pacer::new(clock.now(), shared.cfg.period);
                loop {
                    if shutdown_clone.load(Ordering::Relaxed) {
                        tracing::debug!("update thread received shutdown signal");
                        break;
                    }

                    // Failures are counted and logged inside tick
                    let _ = shared.tick();

                    if shutdown_clone.load(Ordering::Relaxed) {
                        break;
                    }
                    if !pacer.wait(&*clock) {
                        shared.record_overrun();
                    }
                }
                tracing::trace!("update thread exiting cleanly");
            })
            .map_err(|e| OdomError::State(format!("failed to spawn update thread: {e}")))?;

        Ok(Self {
            shutdown,
            join_handle: Some(join_handle),
        })
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // Exits at the next tick boundary; an in-flight read runs to completion.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("update thread joined"),
                Err(e) => tracing::warn!(?e, "update thread panicked during shutdown"),
            }
        }
    }
}
