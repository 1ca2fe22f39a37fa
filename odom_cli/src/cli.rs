//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "odom", version, about = "Tracking-wheel odometry CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/odom_config.toml")]
    pub config: PathBuf,

    /// Print JSON lines instead of plain text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Starting side override.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SideArg {
    Red,
    Blue,
    Skills,
}

impl From<SideArg> for odom_config::Side {
    fn from(s: SideArg) -> Self {
        match s {
            SideArg::Red => odom_config::Side::Red,
            SideArg::Blue => odom_config::Side::Blue,
            SideArg::Skills => odom_config::Side::Skills,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the update loop against the simulated drive in [sim]
    Run {
        /// How long to drive before stopping (ms)
        #[arg(long, value_name = "MS", default_value_t = 2_000)]
        duration_ms: u64,
        /// Starting side (takes precedence over [start].side)
        #[arg(long, value_enum, value_name = "SIDE")]
        side: Option<SideArg>,
        /// Interval between pose reports (ms); 0 prints only the final pose
        #[arg(long, value_name = "MS", default_value_t = 250)]
        report_ms: u64,
    },
    /// Build, calibrate and run a single tick against the simulation
    SelfCheck,
    /// Print the resolved starting pose, geometry and field tables
    ShowConfig {
        /// Starting side (takes precedence over [start].side)
        #[arg(long, value_enum, value_name = "SIDE")]
        side: Option<SideArg>,
    },
}
