use std::path::{Path, PathBuf};
use std::time::Duration;

use super::process::CommandRunner;

/// System install location; preferred because the installer grants it sudoers rights
pub const SYSTEM_BATTERY_PATH: &str = "/usr/local/bin/battery";

pub const INSTALL_HINT: &str =
    "curl -s https://raw.githubusercontent.com/actuallymentor/battery/main/setup.sh | bash";

const BATTERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle on the privileged `battery` SMC-control CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryCli {
    path: PathBuf,
}

impl BatteryCli {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// System path first, then the bundled copy, then whatever `battery` is on PATH
    pub fn locate(bin_dir: &Path) -> Self {
        Self::locate_from(Path::new(SYSTEM_BATTERY_PATH), bin_dir)
    }

    fn locate_from(system: &Path, bin_dir: &Path) -> Self {
        if system.exists() {
            return Self::at(system);
        }

        let bundled = bin_dir.join("battery");
        if bundled.exists() {
            return Self::at(bundled);
        }

        match which::which("battery") {
            Ok(found) => Self::at(found),
            // Report the bundled location; is_available() will be false
            Err(_) => Self::at(bundled),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_available(&self) -> bool {
        self.path.exists()
    }

    /// `battery maintain <percent>`: hold the charge at `percent` indefinitely.
    ///
    /// Returns whether the CLI reported success; failures are only logged.
    pub fn maintain(&self, runner: &dyn CommandRunner, percent: u32) -> bool {
        let percent = percent.to_string();
        let program = self.path.to_string_lossy();

        match runner.run(&program, &["maintain", percent.as_str()], BATTERY_TIMEOUT) {
            Some(output) if output.success => {
                log::info!("battery maintain {} accepted", percent);
                true
            }
            Some(output) => {
                log::warn!(
                    "battery maintain {} failed: {}",
                    percent,
                    output.stderr.trim()
                );
                false
            }
            None => {
                log::warn!("battery maintain {} could not run", percent);
                false
            }
        }
    }
}
