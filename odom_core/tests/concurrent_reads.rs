//! Readers on other threads never observe a partially committed pose.
//!
//! The robot starts at 45 degrees and only ever drives straight, so every
//! committed pose has x == y (up to rounding) and an unchanged heading. A
//! torn read (x from one tick, y from the next) would break that.

use odom_core::{DynOdometry, LoopCfg, PoseTriple, StartingPose};
use odom_hardware::SimulatedSensors;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn readers_see_whole_snapshots_under_load() {
    let sim = SimulatedSensors::new(2.75, 7.0, 3.5);
    let driver = sim.handle();
    let mut odom = DynOdometry::builder()
        .with_sensors(sim)
        .with_starting_pose(StartingPose::BlueSide(PoseTriple::new(0.0, 0.0, 45.0)))
        .with_loop_cfg(LoopCfg {
            period: Duration::from_millis(1),
            ..LoopCfg::default()
        })
        .build()
        .unwrap();
    odom.start().unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let writer = {
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                driver.drive(0.25, 0.0, 0.0);
                thread::sleep(Duration::from_micros(200));
            }
        })
    };

    let heading = odom.get_heading();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let reader = odom.reader();
            let done = done.clone();
            thread::spawn(move || {
                let mut checked = 0u64;
                let mut last_y = f64::NEG_INFINITY;
                while !done.load(Ordering::Relaxed) {
                    let p = reader.pose();
                    assert!(
                        (p.x - p.y).abs() <= 1e-9 * (1.0 + p.y.abs()),
                        "torn pose: {p:?}"
                    );
                    assert_eq!(p.heading_deg(), heading);
                    assert!(p.y >= last_y, "pose went backwards: {} < {last_y}", p.y);
                    last_y = p.y;
                    checked += 1;
                }
                checked
            })
        })
        .collect();

    let t0 = Instant::now();
    while t0.elapsed() < Duration::from_millis(300) {
        let _ = odom.pose();
        thread::sleep(Duration::from_millis(1));
    }
    done.store(true, Ordering::Relaxed);

    writer.join().unwrap();
    for r in readers {
        assert!(r.join().unwrap() > 0);
    }
    odom.stop();
    assert!(odom.stats().committed > 10);
    assert!(odom.get_y() > 0.0);
}
