#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation must reject bad input with an error, never a panic.
    let Ok(cfg) = odom_config::load_toml(data) else {
        return;
    };
    let _ = cfg.validate();
    // Inline tables only; CSV paths would hit the filesystem.
    if cfg.field.goals_csv.is_none()
        && cfg.field.live_objects_csv.is_none()
        && cfg.field.skills_objects_csv.is_none()
    {
        let _ = cfg.field.resolve(std::path::Path::new("."));
    }
    let side = cfg.start.side;
    let _ = cfg.starting_positions.for_side(side);
});
