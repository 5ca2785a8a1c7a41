use super::support::{CannedRunner, PMSET_CHARGING, PROFILER};
use cycler::core::{BatterySnapshot, StatusProbe};
use cycler::AppPaths;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn probe_with(runner: CannedRunner) -> (TempDir, StatusProbe) {
    let home = TempDir::new().unwrap();
    let probe = StatusProbe::new(Arc::new(runner), AppPaths::with_home(home.path()));
    (home, probe)
}

#[test]
fn test_snapshot_from_pmset() {
    let (_home, probe) = probe_with(CannedRunner::default().with("pmset", PMSET_CHARGING));
    assert_eq!(
        probe.battery_snapshot(),
        BatterySnapshot {
            percent: 81,
            charging: true
        }
    );
}

#[test]
fn test_snapshot_never_fails_on_malformed_output() {
    for garbage in ["", "no battery here", "%%%", "100 %", "\u{fffd}\u{fffd}", "id=12 %"] {
        let (_home, probe) = probe_with(CannedRunner::default().with("pmset", garbage));
        assert_eq!(probe.battery_snapshot(), BatterySnapshot::default(), "input {:?}", garbage);
    }
}

#[test]
fn test_snapshot_fallback_when_pmset_missing() {
    let (_home, probe) = probe_with(CannedRunner::default());
    assert_eq!(probe.battery_snapshot(), BatterySnapshot::default());
}

#[test]
fn test_cycle_and_health_combines_sources() {
    let (home, probe) = probe_with(CannedRunner::default().with("system_profiler", PROFILER));
    fs::write(
        home.path().join("battery_cycle_state.txt"),
        "TOTAL_DISCHARGE_CYCLES=17\n",
    )
    .unwrap();

    assert_eq!(probe.cycle_and_health(), (17, "90%".to_string()));
}

#[test]
fn test_cycle_and_health_placeholders() {
    let (home, probe) = probe_with(CannedRunner::default());
    fs::write(
        home.path().join("battery_cycle_state.txt"),
        "TOTAL_DISCHARGE_CYCLES=oops\n",
    )
    .unwrap();

    assert_eq!(probe.cycle_and_health(), (0, "--".to_string()));
}
