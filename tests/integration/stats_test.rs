use super::support::{CannedRunner, IOREG, PROFILER};
use cycler::core::stats::{cycles_added, format_delta, health_change};
use cycler::core::{fmt_time, SessionCounters, StatsAggregator, StatusProbe};
use cycler::ui::render_report;
use cycler::{AppPaths, Config};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_fmt_time_truncates_minutes() {
    assert_eq!(fmt_time(0), "0m");
    assert_eq!(fmt_time(59), "0m");
    assert_eq!(fmt_time(90), "1m");
    assert_eq!(fmt_time(3661), "1h 1m");
}

#[test]
fn test_health_change_examples() {
    assert_eq!(format_delta(health_change(Some("75.0"), Some(76.3)).unwrap()), "+1.3%");
    assert_eq!(format_delta(health_change(Some("80.0"), Some(79.0)).unwrap()), "-1.0%");
}

#[test]
fn test_cycles_added_only_for_integers() {
    for (apple, initial, expected) in [
        ("250", "200", Some(50)),
        ("200", "250", Some(-50)),
        ("N/A", "200", None),
        ("250", "", None),
        ("12.5", "10", None),
    ] {
        assert_eq!(cycles_added(Some(apple), Some(initial)), expected, "{} - {}", apple, initial);
    }
}

#[test]
fn test_counter_file_with_two_lines() {
    let home = TempDir::new().unwrap();
    let paths = AppPaths::with_home(home.path());
    fs::write(&paths.state_file, "TOTAL_DISCHARGE_CYCLES=42\nINITIAL_HEALTH=\"88\"\n").unwrap();

    let runner = Arc::new(CannedRunner::default().with("ioreg", IOREG));
    let probe = StatusProbe::new(runner, paths);
    let report = StatsAggregator::new(&probe).collect(&Config::default());

    assert_eq!(report.script_cycles, 42);
    assert_eq!(report.initial_health_display(), "88%");
    assert_eq!(report.total_active_secs, 0);
    assert_eq!(report.total_discharge_secs, 0);
    assert_eq!(report.total_charge_secs, 0);
    // Calculated health still comes from the registers
    assert_eq!(report.calculated_health_display(), "80%");
    assert_eq!(report.health_change_display(), "-8.0%");
    assert_eq!(report.apple_health_display(), "N/A");
}

#[test]
fn test_full_report_from_all_sources() {
    let home = TempDir::new().unwrap();
    let paths = AppPaths::with_home(home.path());
    fs::write(
        &paths.state_file,
        "TOTAL_DISCHARGE_CYCLES=5\nINITIAL_HEALTH=\"82\"\nINITIAL_APPLE_CYCLES=\"221\"\nTOTAL_ACTIVE_SECS=9000\nTOTAL_DISCHARGE_SECS=5400\nTOTAL_CHARGE_SECS=3600\n",
    )
    .unwrap();

    let runner = Arc::new(
        CannedRunner::default()
            .with("system_profiler", PROFILER)
            .with("ioreg", IOREG),
    );
    let probe = StatusProbe::new(runner, paths.clone());
    let counters = SessionCounters::load(&paths.state_file);
    let report = StatsAggregator::new(&probe).build_report(&Config::default(), &counters);

    assert_eq!(report.apple_health_display(), "90%");
    assert_eq!(report.condition_display(), "Normal");
    assert_eq!(report.apple_cycles_display(), "230");
    assert_eq!(report.cycles_added_display(), "9");
    assert_eq!(report.capacity_display(), "4000/5000 mAh");
    assert_eq!(report.health_change_display(), "-2.0%");

    let text = render_report(&report);
    assert!(text.contains("Total Active: 2h 30m"));
    assert!(text.contains("Time Discharging: 1h 30m"));
    assert!(text.contains("Time Charging: 1h 0m"));
    assert!(text.contains("Initial Cycles: 221"));
}

#[test]
fn test_report_with_no_sources_is_all_placeholders() {
    let home = TempDir::new().unwrap();
    let probe = StatusProbe::new(
        Arc::new(CannedRunner::default()),
        AppPaths::with_home(home.path()),
    );
    let report = StatsAggregator::new(&probe).collect(&Config::default());

    assert_eq!(report.script_cycles, 0);
    assert_eq!(report.apple_health_display(), "N/A");
    assert_eq!(report.calculated_health_display(), "N/A");
    assert_eq!(report.capacity_display(), "N/A");
    assert_eq!(report.cycles_added_display(), "N/A");
    assert_eq!(report.health_change_display(), "N/A");
    assert_eq!(report.initial_health_display(), "N/A");
}
