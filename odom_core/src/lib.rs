#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::too_many_arguments
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Tracking-wheel odometry engine (hardware-agnostic).
//!
//! This crate fuses an inertial sensor with two passive tracking wheels into
//! a dead-reckoned field pose. All hardware interactions go through the
//! `odom_traits::Inertial` and `odom_traits::TrackingWheels` traits.
//!
//! ## Architecture
//!
//! - **Deadband**: per-axis jitter suppression (`deadband` module)
//! - **Arc integration**: chord projection along the midpoint heading (`arc` module)
//! - **Tracker**: sample → filter → wheel deltas → arc → commit (`tracker` module)
//! - **Update loop**: fixed-period worker thread (`update_loop` module)
//! - **Lifecycle**: start/stop/calibrate and pose accessors (`Odometry`)
//!
//! ## Frame
//!
//! +y is the robot's forward direction at heading 0, +x is to its right, and
//! heading increases clockwise. Heading is kept in unbounded radians.

pub mod arc;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod deadband;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod odometry;
pub mod pose;
pub mod tracker;
pub mod update_loop;
pub mod util;

pub use crate::arc::{ArcInput, ArcStep, integrate};
pub use crate::builder::{DynOdometry, Missing, OdometryBuilder, Set, build_odometry};
pub use crate::config::{
    FieldPoint, FieldTables, LoopCfg, PoseTriple, StartingPose, StartingPositions, StartingSide,
    TrackingGeometry,
};
pub use crate::deadband::{DEFAULT_DEADBAND_DEG, FilteredChannel, deadband};
pub use crate::error::{BuildError, OdomError, Report, Result};
pub use crate::odometry::{Odometry, PoseReader};
pub use crate::pose::{CalibrationOffset, Pose};
pub use crate::tracker::{Attitude, Sample, TickDiagnostics, WheelTravel, read_sample};
pub use crate::update_loop::LoopStats;
pub use crate::util::Pacer;
