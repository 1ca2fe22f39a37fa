use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use odom_core::mocks::ScriptedSensors;
use odom_core::{ArcInput, DynOdometry, Pose, PoseTriple, Sample, StartingPose, integrate};

// Synthetic drive: steady forward travel with a slowly wandering heading
fn synth_drive(n: usize, seed: u32) -> Vec<Sample> {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next_f64 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    let mut v = Vec::with_capacity(n);
    let (mut rot, mut right, mut middle) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let t = i as f64 / 200.0;
        rot += t.sin() * 0.5 + (next_f64() - 0.5) * 0.004;
        right += 8.0;
        middle += (next_f64() - 0.5) * 2.0;
        v.push(Sample {
            rotation_deg: rot,
            right_deg: right,
            middle_deg: middle,
            ..Sample::default()
        });
    }
    v
}

fn configure(g: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p odom_core --bench arc_integrator
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }
}

pub fn bench_integrate(c: &mut Criterion) {
    let mut g = c.benchmark_group("arc_integrate");
    configure(&mut g);

    for &d_theta in &[0.0f64, 0.002, 0.05] {
        g.bench_function(format!("d_theta_{d_theta}"), |b| {
            let mut pose = Pose::default();
            b.iter(|| {
                let input = ArcInput {
                    filtered_heading_rad: pose.heading_rad + d_theta,
                    d_right: 0.12,
                    d_middle: -0.01,
                    r_right: 7.0,
                    r_middle: 3.5,
                    rotation_epsilon_rad: 0.01f64.to_radians(),
                };
                pose = integrate(black_box(&pose), black_box(&input)).pose;
                black_box(pose);
            });
        });
    }
    g.finish();
}

pub fn bench_step(c: &mut Criterion) {
    let mut g = c.benchmark_group("odometry_step");
    configure(&mut g);

    let script = synth_drive(10_000, 0x00C0_FFEE);
    g.bench_function("scripted_10k_ticks", |b| {
        b.iter_batched(
            || {
                DynOdometry::builder()
                    .with_sensors(ScriptedSensors::new(script.clone(), 2.75, 7.0, 3.5))
                    .with_starting_pose(StartingPose::SkillsMode(PoseTriple::new(0.0, 0.0, 0.0)))
                    .build()
                    .unwrap()
            },
            |odom| {
                for _ in 0..script.len() {
                    let _ = odom.step();
                }
                black_box(odom.pose());
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(arc_integrator, bench_integrate, bench_step);
criterion_main!(arc_integrator);
