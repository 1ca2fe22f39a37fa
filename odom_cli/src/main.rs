#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! odom CLI: config loading, logging setup, and the simulated run.

mod cli;
mod error_fmt;
mod logging;
mod run;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use clap::Parser;
use eyre::WrapErr;
use odom_config::{Config, ResolvedField};
use odom_core::OdomError;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        tracing::error!(error = %e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            println!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let (cfg, field) = load_config(&cli.config)?;
    logging::init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run {
            duration_ms,
            side,
            report_ms,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            run::run(
                &cfg,
                &field,
                side,
                duration_ms,
                report_ms,
                cli.json,
                &shutdown,
            )
        }
        Commands::SelfCheck => run::self_check(&cfg, &field, cli.json),
        Commands::ShowConfig { side } => run::show_config(&cfg, &field, side, cli.json),
    }
}

fn config_error(msg: String) -> eyre::Report {
    eyre::Report::new(OdomError::Config(msg))
}

/// Read, parse, validate and resolve the config. Field CSV paths are relative
/// to the config file's directory.
fn load_config(path: &Path) -> eyre::Result<(Config, ResolvedField)> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = odom_config::load_toml(&text).map_err(|e| config_error(e.to_string()))?;
    cfg.validate().map_err(|e| config_error(e.to_string()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let field = cfg
        .field
        .resolve(base)
        .map_err(|e| config_error(e.to_string()))?;
    Ok((cfg, field))
}
