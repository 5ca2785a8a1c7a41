//! Cycling session supervision.
//!
//! The session itself is an external script running in its own process
//! group. The controller owns the only handle to it, together with the
//! configuration the script reads when it starts.
//!
//! ```text
//!            start()                      stop() / override_to_percent()
//!   Idle ─────────────────▶ Active ─────────────────────────────────▶ Idle
//!    ▲                        │
//!    └────── script exited ───┘   (noticed lazily on the next state query)
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::config::{Config, ConfigStore, LimitKind, StressLevel};
use super::paths::AppPaths;
use crate::error::Result;
use crate::platform::process::{self, Termination};
use crate::platform::{BatteryCli, CommandRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Active,
}

/// Which hold point an override sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideRole {
    /// "Pause": hold at the chosen percent
    Pause,
    /// "Stop & reset": hold at the chosen percent after stopping
    Reset,
}

impl OverrideRole {
    pub fn limit(&self) -> LimitKind {
        match self {
            OverrideRole::Pause => LimitKind::Pause,
            OverrideRole::Reset => LimitKind::Reset,
        }
    }
}

/// Outcome of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NotRunning,
    Stopped(Termination),
}

/// Starts, stops and overrides the external cycling session.
pub struct CycleSessionController {
    store: ConfigStore,
    config: Config,
    script: PathBuf,
    battery: BatteryCli,
    runner: Arc<dyn CommandRunner>,
    session: Option<Child>,
}

impl CycleSessionController {
    /// Loads the config from `store`; the session always starts out Idle
    pub fn new(
        store: ConfigStore,
        script: impl Into<PathBuf>,
        battery: BatteryCli,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let config = store.load();
        Self {
            store,
            config,
            script: script.into(),
            battery,
            runner,
            session: None,
        }
    }

    pub fn from_paths(paths: &AppPaths, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(
            ConfigStore::new(&paths.config_file),
            &paths.script,
            BatteryCli::locate(&paths.bin_dir),
            runner,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn battery(&self) -> &BatteryCli {
        &self.battery
    }

    /// Pid of the tracked session, if any
    pub fn session_pid(&mut self) -> Option<u32> {
        self.refresh();
        self.session.as_ref().map(Child::id)
    }

    /// Current state; a session that has exited since the last query is dropped here
    pub fn state(&mut self) -> SessionState {
        self.refresh();
        if self.session.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub fn is_active(&mut self) -> bool {
        self.state() == SessionState::Active
    }

    fn refresh(&mut self) {
        let exited = match self.session.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(None) => false,
                Ok(Some(status)) => {
                    log::info!("Cycling session {} exited: {}", child.id(), status);
                    true
                }
                Err(e) => {
                    log::warn!("Lost track of cycling session {}: {}", child.id(), e);
                    true
                }
            },
            None => false,
        };

        if exited {
            self.session = None;
        }
    }

    /// Persist the config and launch the cycling script. Ignored while Active.
    pub fn start(&mut self) -> Result<SessionState> {
        if self.is_active() {
            log::debug!("start() ignored: a session is already running");
            return Ok(SessionState::Active);
        }

        self.store.save(&self.config)?;

        let child = process::spawn_session(&self.script)?;
        log::info!("Started cycling session (pid {})", child.id());
        self.session = Some(child);

        Ok(SessionState::Active)
    }

    /// Terminate the session's process group. Ignored while Idle.
    pub fn stop(&mut self) -> StopOutcome {
        if !self.is_active() {
            return StopOutcome::NotRunning;
        }

        match self.session.take() {
            Some(mut child) => {
                let termination = process::terminate_group(&mut child);
                log::info!("Stopped cycling session {} ({:?})", child.id(), termination);
                reap(child);
                StopOutcome::Stopped(termination)
            }
            None => StopOutcome::NotRunning,
        }
    }

    /// Stop when Active, start when Idle
    pub fn toggle(&mut self) -> Result<SessionState> {
        if self.is_active() {
            self.stop();
            Ok(SessionState::Idle)
        } else {
            self.start()
        }
    }

    /// Hold the battery at `value` percent through the external maintain command.
    ///
    /// Saves the pause or reset limit, stops any running session, kills the
    /// stress helpers and hands control to `battery maintain`. The controller
    /// stays Idle afterwards; the maintain command runs on its own.
    ///
    /// A failed save is reported only after the hold has been applied.
    pub fn override_to_percent(&mut self, role: OverrideRole, value: u32) -> Result<()> {
        self.config.set_limit(role.limit(), value);
        let saved = self.store.save(&self.config);

        self.stop();
        process::kill_stress_helpers(self.runner.as_ref());
        self.battery.maintain(self.runner.as_ref(), value);

        saved
    }

    pub fn set_limit(&mut self, kind: LimitKind, value: u32) -> Result<()> {
        kind.validate(value)?;
        self.config.set_limit(kind, value);
        self.store.save(&self.config)
    }

    pub fn set_cpu_stress(&mut self, level: StressLevel) -> Result<()> {
        self.config.cpu_stress = level;
        self.store.save(&self.config)
    }

    pub fn set_gpu_stress(&mut self, level: StressLevel) -> Result<()> {
        self.config.gpu_stress = level;
        self.store.save(&self.config)
    }

    /// Signal the session group on the way out without waiting for it to exit
    pub fn shutdown(&mut self) {
        if let Some(mut child) = self.session.take() {
            if matches!(child.try_wait(), Ok(None)) {
                let termination = process::terminate_group(&mut child);
                log::debug!("Shutdown signalled session {} ({:?})", child.id(), termination);
            }
        }
    }
}

impl Drop for CycleSessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

const REAP_TIMEOUT: Duration = Duration::from_secs(10);
const REAP_POLL: Duration = Duration::from_millis(100);

/// Collect the exit status off-thread so a stopped session does not linger as a zombie
fn reap(mut child: Child) {
    let spawned = std::thread::Builder::new()
        .name("cycler-reap".to_string())
        .spawn(move || {
            reap_within(&mut child, REAP_TIMEOUT);
        });

    if let Err(e) = spawned {
        log::debug!("Could not spawn reaper thread: {}", e);
    }
}

/// Poll for the child's exit for at most `timeout`. Returns whether it was reaped.
fn reap_within(child: &mut Child, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) if Instant::now() < deadline => std::thread::sleep(REAP_POLL),
            Ok(None) => {
                log::warn!(
                    "Cycling session {} still running {:?} after SIGTERM; giving up on it",
                    child.id(),
                    timeout
                );
                return false;
            }
            Err(e) => {
                log::debug!("Could not reap session {}: {}", child.id(), e);
                return false;
            }
        }
    }
}
