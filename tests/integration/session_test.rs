#![cfg(unix)]

use super::support::CannedRunner;
use cycler::core::StopOutcome;
use cycler::platform::{BatteryCli, Termination};
use cycler::{AppPaths, ConfigStore, CycleSessionController, OverrideRole, SessionState};
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn setup(script_body: &str) -> (TempDir, AppPaths, Arc<CannedRunner>) {
    let home = TempDir::new().unwrap();
    let paths = AppPaths::with_home(home.path());
    fs::create_dir_all(paths.script.parent().unwrap()).unwrap();
    fs::write(&paths.script, script_body).unwrap();
    (home, paths, Arc::new(CannedRunner::default()))
}

fn controller(paths: &AppPaths, runner: &Arc<CannedRunner>) -> CycleSessionController {
    CycleSessionController::new(
        ConfigStore::new(&paths.config_file),
        &paths.script,
        BatteryCli::at(paths.bin_dir.join("battery")),
        runner.clone(),
    )
}

fn process_gone(pid: u32) -> bool {
    // SAFETY: signal 0 only checks for existence
    unsafe { libc::kill(pid as libc::pid_t, 0) != 0 }
}

#[test]
fn test_toggle_twice_returns_to_idle_and_kills_group() {
    let (_home, paths, runner) = setup("sleep 30 &\nwait\n");
    let mut ctl = controller(&paths, &runner);

    assert_eq!(ctl.state(), SessionState::Idle);
    assert_eq!(ctl.toggle().unwrap(), SessionState::Active);
    let pid = ctl.session_pid().expect("session should be tracked");

    assert_eq!(ctl.toggle().unwrap(), SessionState::Idle);
    assert_eq!(ctl.session_pid(), None);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !process_gone(pid) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(25));
    }
    assert!(process_gone(pid), "session {} still running after stop", pid);
}

#[test]
fn test_start_writes_config_for_the_script() {
    let (_home, paths, runner) = setup("exec sleep 30\n");
    let mut ctl = controller(&paths, &runner);
    ctl.set_limit(cycler::core::LimitKind::Upper, 90).unwrap();

    ctl.start().unwrap();
    let saved = ConfigStore::new(&paths.config_file).load();
    assert_eq!(saved.upper_limit, 90);
    assert!(matches!(ctl.stop(), StopOutcome::Stopped(Termination::GroupSignalled)));
}

#[test]
fn test_pause_override_from_active() {
    let (_home, paths, runner) = setup("exec sleep 30\n");
    let mut ctl = controller(&paths, &runner);

    ctl.start().unwrap();
    ctl.override_to_percent(OverrideRole::Pause, 55).unwrap();

    assert_eq!(ctl.state(), SessionState::Idle);
    assert_eq!(ConfigStore::new(&paths.config_file).load().pause_limit, 55);

    let battery = paths.bin_dir.join("battery");
    let calls = runner.calls();
    assert!(calls.contains(&"pkill -9 stress-ng".to_string()));
    assert!(calls.contains(&"pkill -f ffmpeg.*videotoolbox".to_string()));
    assert_eq!(
        calls.last().unwrap(),
        &format!("{} maintain 55", battery.display())
    );
}

#[test]
fn test_reset_override_from_idle_persists() {
    let (_home, paths, runner) = setup("exec sleep 30\n");
    let mut ctl = controller(&paths, &runner);

    ctl.override_to_percent(OverrideRole::Reset, 75).unwrap();

    assert_eq!(ctl.state(), SessionState::Idle);
    assert_eq!(ConfigStore::new(&paths.config_file).load().reset_limit, 75);
}

#[test]
fn test_new_controller_starts_idle() {
    let (_home, paths, runner) = setup("exec sleep 30\n");
    let mut ctl = controller(&paths, &runner);
    assert_eq!(ctl.state(), SessionState::Idle);
    assert_eq!(ctl.stop(), StopOutcome::NotRunning);
}

#[test]
fn test_shutdown_signals_without_waiting() {
    let (_home, paths, runner) = setup("exec sleep 30\n");
    let mut ctl = controller(&paths, &runner);

    ctl.start().unwrap();
    assert!(ctl.session_pid().is_some());

    let started = Instant::now();
    ctl.shutdown();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(ctl.state(), SessionState::Idle);
}
