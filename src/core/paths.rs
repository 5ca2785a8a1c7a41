use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "battery_cycle_config.json";
const STATE_FILE_NAME: &str = "battery_cycle_state.txt";
const LOG_FILE_NAME: &str = "battery_cycles.log";
const SCRIPT_FILE_NAME: &str = "battery_cycle.sh";

/// Overrides the home directory every other path hangs off
pub const HOME_ENV: &str = "CYCLER_HOME";
/// Overrides the location of the cycling session script
pub const SCRIPT_ENV: &str = "CYCLER_SCRIPT";

/// Fixed filesystem locations used by the controller.
///
/// The config, session-counter and log files live directly in the user's
/// home directory so the external cycling script can find them without any
/// configuration of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub home: PathBuf,
    pub config_file: PathBuf,
    pub state_file: PathBuf,
    pub log_file: PathBuf,
    pub script: PathBuf,
    pub bin_dir: PathBuf,
}

impl AppPaths {
    /// Resolve paths for the current user, honoring `CYCLER_HOME` and `CYCLER_SCRIPT`
    pub fn discover() -> Result<Self> {
        let home = match env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir().with_context(|| "Could not determine home directory")?,
        };

        let mut paths = Self::with_home(&home);

        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        paths.script = match env::var_os(SCRIPT_ENV) {
            Some(script) if !script.is_empty() => PathBuf::from(script),
            _ => locate_bundled(exe_dir.as_deref(), SCRIPT_FILE_NAME)
                .unwrap_or_else(|| default_support_dir(&home).join(SCRIPT_FILE_NAME)),
        };

        paths.bin_dir = locate_bundled(exe_dir.as_deref(), "bin")
            .unwrap_or_else(|| default_support_dir(&home).join("bin"));

        Ok(paths)
    }

    /// Lay every path out under `home` (used by tests and by `CYCLER_HOME`)
    pub fn with_home(home: &Path) -> Self {
        let support = default_support_dir(home);
        Self {
            home: home.to_path_buf(),
            config_file: home.join(CONFIG_FILE_NAME),
            state_file: home.join(STATE_FILE_NAME),
            log_file: home.join(LOG_FILE_NAME),
            script: support.join(SCRIPT_FILE_NAME),
            bin_dir: support.join("bin"),
        }
    }
}

fn default_support_dir(home: &Path) -> PathBuf {
    home.join(".battery-cycler")
}

/// Look next to the executable, then in an app bundle's `Resources` folder
fn locate_bundled(exe_dir: Option<&Path>, name: &str) -> Option<PathBuf> {
    let exe_dir = exe_dir?;
    let candidates = [
        exe_dir.join(name),
        exe_dir.join("..").join("Resources").join(name),
    ];
    candidates.into_iter().find(|candidate| candidate.exists())
}
