//! External process plumbing.
//!
//! Every query the controller makes of the OS goes through [`CommandRunner`]
//! with an explicit timeout. The session script is the one long-lived child;
//! it is spawned in its own process group so the whole group can be signalled
//! at once.

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use crate::error::{CyclerError, Result};

/// Captured result of a finished external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout of a successful run, `None` otherwise
    pub fn into_stdout(self) -> Option<String> {
        self.success.then_some(self.stdout)
    }
}

/// Runs short-lived external commands with a hard timeout.
///
/// `None` means the command could not be started or did not finish in time.
/// Callers turn that into their own fallback value.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Option<CommandOutput>;
}

/// [`CommandRunner`] backed by a private current-thread Tokio runtime.
///
/// A command that outlives its timeout is abandoned, not killed: the child
/// keeps running and Tokio reaps it in the background.
pub struct SystemRunner {
    runtime: tokio::runtime::Runtime,
}

impl SystemRunner {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .thread_name("cycler-exec")
            .build()?;
        Ok(Self { runtime })
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Option<CommandOutput> {
        self.runtime.block_on(async {
            let mut command = tokio::process::Command::new(program);
            command.args(args).stdin(Stdio::null()).kill_on_drop(false);

            match tokio::time::timeout(timeout, command.output()).await {
                Ok(Ok(output)) => Some(CommandOutput {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }),
                Ok(Err(e)) => {
                    log::debug!("Failed to run {}: {}", program, e);
                    None
                }
                Err(_) => {
                    log::warn!("{} timed out after {:?}", program, timeout);
                    None
                }
            }
        })
    }
}

/// Patterns for helper processes the cycling script starts to put load on the machine
pub const STRESS_HELPER_KILLS: [&[&str]; 2] = [
    &["-9", "stress-ng"],
    &["-f", "ffmpeg.*videotoolbox"],
];

const PKILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Kill the CPU/GPU load helpers. Failures, including "no such process", are ignored.
pub fn kill_stress_helpers(runner: &dyn CommandRunner) {
    for args in STRESS_HELPER_KILLS {
        match runner.run("pkill", args, PKILL_TIMEOUT) {
            Some(output) if output.success => log::debug!("pkill {:?}: killed", args),
            Some(_) => log::debug!("pkill {:?}: nothing matched", args),
            None => log::debug!("pkill {:?}: could not run", args),
        }
    }
}

/// Launch `bash <script>` detached in a new process group with all stdio discarded
pub fn spawn_session(script: &Path) -> Result<Child> {
    let mut command = Command::new("bash");
    command
        .arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    command.spawn().map_err(|e| {
        CyclerError::process(format!("failed to launch cycling script {:?}: {}", script, e))
    })
}

/// How a termination request was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// SIGTERM went to the whole process group
    GroupSignalled,
    /// Group signalling failed; SIGTERM went to the tracked process alone
    ProcessTerminated,
    /// Both attempts failed
    Failed,
}

/// Signal the child's process group, falling back to terminating the child alone
pub fn terminate_group(child: &mut Child) -> Termination {
    match signal_group(child.id()) {
        Ok(()) => Termination::GroupSignalled,
        Err(e) => {
            log::debug!("Group signal for pid {} failed: {}", child.id(), e);
            match terminate_process(child) {
                Ok(()) => Termination::ProcessTerminated,
                Err(e) => {
                    log::warn!("Could not terminate pid {}: {}", child.id(), e);
                    Termination::Failed
                }
            }
        }
    }
}

#[cfg(unix)]
fn signal_group(pid: u32) -> std::io::Result<()> {
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range"))?;

    // SAFETY: getpgid/getpgrp/killpg only take plain integers and report
    // failure through the return value and errno.
    let pgid = unsafe { libc::getpgid(pid) };
    if pgid < 0 {
        return Err(std::io::Error::last_os_error());
    }

    // Never signal our own group if the child did not get one of its own
    if pgid == unsafe { libc::getpgrp() } {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "child shares the controller's process group",
        ));
    }

    if unsafe { libc::killpg(pgid, libc::SIGTERM) } != 0 {
        return Err(std::io::Error::last_os_error());
    }

    Ok(())
}

#[cfg(not(unix))]
fn signal_group(_pid: u32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "process groups are not supported on this platform",
    ))
}

/// SIGTERM to the child only, so its own TERM handling still runs
#[cfg(unix)]
fn terminate_process(child: &mut Child) -> std::io::Result<()> {
    let pid = libc::pid_t::try_from(child.id())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range"))?;

    // SAFETY: kill only takes plain integers and reports failure through errno
    if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
        return Err(std::io::Error::last_os_error());
    }

    Ok(())
}

#[cfg(not(unix))]
fn terminate_process(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}
