//! Engine assembly from config and the run/self-check/show-config commands.

use crate::cli::SideArg;
use odom_config::{Config, ResolvedField};
use odom_core::util::rate_hz;
use odom_core::{DynOdometry, LoopCfg, LoopStats, OdomError, Pose, StartingPositions};
use odom_hardware::{DriveProfile, SimHandle, SimulatedChassis, SimulatedSensors, TruePose};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Build the engine over the simulated provider, with the ground truth placed
/// on the selected starting pose.
pub fn build_engine(
    cfg: &Config,
    field: &ResolvedField,
    side: Option<SideArg>,
) -> eyre::Result<(DynOdometry, SimHandle)> {
    let geometry = cfg.geometry.unwrap_or_default();
    let sim = SimulatedSensors::new(
        geometry.wheel_diameter_in,
        geometry.right_offset_in,
        geometry.middle_offset_in,
    );
    let handle = sim.handle();
    handle.set_jitter(cfg.sim.imu_jitter_deg);
    handle.set_fail_reads(cfg.sim.fail_reads);

    let side: odom_config::Side = side.map_or(cfg.start.side, Into::into);
    let table: StartingPositions = (&cfg.starting_positions).into();
    let start = table.resolve(side.into());
    let t = start.triple();
    handle.place(TruePose {
        x: t.x,
        y: t.y,
        heading_deg: t.heading_deg,
    });

    let mut builder = DynOdometry::builder()
        .with_sensors(sim)
        .with_starting_pose(start)
        .with_loop_cfg(LoopCfg::from(cfg))
        .with_field(field.into())
        .with_chassis(SimulatedChassis::default());
    if let Some(g) = &cfg.geometry {
        builder = builder.with_geometry(g.into());
    }
    let odom = builder.build()?;
    tracing::info!(
        side = ?start.side(),
        x = t.x,
        y = t.y,
        heading = t.heading_deg,
        chassis = odom.chassis().name(),
        "engine ready"
    );
    Ok((odom, handle))
}

fn print_pose(json: bool, t_ms: u128, pose: &Pose) {
    if json {
        println!(
            "{}",
            json!({
                "event": "pose",
                "t_ms": t_ms as u64,
                "x": pose.x,
                "y": pose.y,
                "heading_deg": pose.heading_deg(),
            })
        );
    } else {
        println!(
            "t={t_ms}ms x={:.3} y={:.3} heading={:.3}",
            pose.x,
            pose.y,
            pose.heading_deg()
        );
    }
}

fn print_final(json: bool, pose: &Pose, truth: &TruePose, stats: &LoopStats) {
    if json {
        println!(
            "{}",
            json!({
                "event": "final",
                "x": pose.x,
                "y": pose.y,
                "heading_deg": pose.heading_deg(),
                "heading_wrapped_deg": pose.heading_wrapped_deg(),
                "truth": { "x": truth.x, "y": truth.y, "heading_deg": truth.heading_deg },
                "stats": {
                    "committed": stats.committed,
                    "skipped": stats.skipped,
                    "overruns": stats.overruns,
                },
            })
        );
    } else {
        println!(
            "final: x={:.3} y={:.3} heading={:.3} (truth x={:.3} y={:.3} heading={:.3})",
            pose.x,
            pose.y,
            pose.heading_deg(),
            truth.x,
            truth.y,
            truth.heading_deg
        );
        println!(
            "ticks: committed={} skipped={} overruns={}",
            stats.committed, stats.skipped, stats.overruns
        );
    }
}

/// Drive the simulation under `[sim]` while the update loop tracks it.
pub fn run(
    cfg: &Config,
    field: &ResolvedField,
    side: Option<SideArg>,
    duration_ms: u64,
    report_ms: u64,
    json: bool,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<()> {
    let (mut odom, sim) = build_engine(cfg, field, side)?;
    odom.calibrate();
    odom.start().map_err(eyre::Report::new)?;

    let profile = DriveProfile {
        forward_ips: cfg.sim.forward_ips,
        strafe_ips: cfg.sim.strafe_ips,
        turn_dps: cfg.sim.turn_dps,
    };
    let period = odom.loop_cfg().period;
    let duration = Duration::from_millis(duration_ms);
    let report = Duration::from_millis(report_ms);
    let reader = odom.reader();

    let t0 = Instant::now();
    let mut last = t0;
    let mut next_report = t0 + report;
    while t0.elapsed() < duration {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("interrupted; stopping");
            break;
        }
        std::thread::sleep(period);
        let now = Instant::now();
        sim.advance(profile, now - last);
        last = now;
        if report_ms > 0 && now >= next_report {
            print_pose(json, now.duration_since(t0).as_millis(), &reader.pose());
            next_report += report;
        }
    }

    odom.stop();
    let stats = odom.stats();
    if stats.committed == 0 {
        // Surface the typed read failure instead of a pose that never moved
        odom.step().map_err(eyre::Report::new)?;
    }
    print_final(json, &odom.pose(), &sim.true_pose(), &stats);
    tracing::info!(
        committed = stats.committed,
        skipped = stats.skipped,
        overruns = stats.overruns,
        "run finished"
    );
    Ok(())
}

/// Calibrate and run one synchronous tick.
pub fn self_check(cfg: &Config, field: &ResolvedField, json: bool) -> eyre::Result<()> {
    let (odom, _sim) = build_engine(cfg, field, None)?;
    odom.calibrate();
    let pose = odom.step().map_err(eyre::Report::new)?;
    if !pose.is_finite() {
        return Err(eyre::Report::new(OdomError::State(
            "self-check produced a non-finite pose".into(),
        )));
    }
    if json {
        println!("{}", json!({ "event": "self_check", "status": "ok" }));
    } else {
        println!("ok");
    }
    Ok(())
}

/// Print the resolved starting pose, geometry, timing and field tables.
pub fn show_config(
    cfg: &Config,
    field: &ResolvedField,
    side: Option<SideArg>,
    json: bool,
) -> eyre::Result<()> {
    let (odom, _sim) = build_engine(cfg, field, side)?;
    let start = odom.starting_pose();
    let t = start.triple();
    let g = odom.geometry();
    let lc = odom.loop_cfg();
    let tables = odom.field();
    let side_name = match start.side() {
        odom_core::StartingSide::Red => "red",
        odom_core::StartingSide::Blue => "blue",
        odom_core::StartingSide::Skills => "skills",
    };
    let objects = tables.objects_for(start.side());

    if json {
        let points = |v: &[odom_core::FieldPoint]| {
            v.iter()
                .map(|p| json!({ "name": p.name, "x": p.x, "y": p.y }))
                .collect::<Vec<_>>()
        };
        println!(
            "{}",
            json!({
                "side": side_name,
                "start": { "x": t.x, "y": t.y, "heading_deg": t.heading_deg },
                "geometry": {
                    "wheel_diameter_in": g.wheel_diameter_in,
                    "right_offset_in": g.right_offset_in,
                    "middle_offset_in": g.middle_offset_in,
                },
                "update": {
                    "period_ms": lc.period.as_millis() as u64,
                    "rate_hz": rate_hz(lc.period),
                    "sensor_timeout_ms": lc.sensor_timeout.as_millis() as u64,
                },
                "deadband_deg": lc.deadband_deg,
                "goals": points(&tables.goals),
                "objects": points(objects),
            })
        );
        return Ok(());
    }

    println!(
        "side: {side_name} start: x={:.3} y={:.3} heading={:.3}",
        t.x, t.y, t.heading_deg
    );
    println!(
        "geometry: diameter={} right_offset={} middle_offset={}",
        g.wheel_diameter_in, g.right_offset_in, g.middle_offset_in
    );
    println!(
        "update: period={}ms ({:.1} Hz) sensor_timeout={}ms deadband={}deg",
        lc.period.as_millis(),
        rate_hz(lc.period),
        lc.sensor_timeout.as_millis(),
        lc.deadband_deg
    );
    println!("goals: {}", tables.goals.len());
    for p in &tables.goals {
        println!("  {} ({:.3}, {:.3})", p.name, p.x, p.y);
    }
    println!("objects: {}", objects.len());
    for p in objects {
        println!("  {} ({:.3}, {:.3})", p.name, p.x, p.y);
    }
    Ok(())
}
