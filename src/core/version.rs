use std::path::Path;
use std::time::Duration;

use crate::platform::CommandRunner;

/// Commit recorded by build.rs when the binary was built
pub const BUILD_COMMIT: &str = env!("CYCLER_BUILD_COMMIT");

const GIT_TIMEOUT: Duration = Duration::from_secs(2);

/// `v<version> (<commit>)`, preferring the live checkout's commit when running from source
pub fn version_string(runner: &dyn CommandRunner) -> String {
    let commit = live_commit(runner, Path::new(env!("CARGO_MANIFEST_DIR")))
        .unwrap_or_else(|| BUILD_COMMIT.to_string());
    format!("v{} ({})", env!("CARGO_PKG_VERSION"), commit)
}

fn live_commit(runner: &dyn CommandRunner, repo: &Path) -> Option<String> {
    if !repo.join(".git").exists() {
        return None;
    }

    let repo = repo.to_string_lossy();
    runner
        .run(
            "git",
            &["-C", repo.as_ref(), "rev-parse", "--short", "HEAD"],
            GIT_TIMEOUT,
        )?
        .into_stdout()
        .map(|out| out.trim().to_string())
        .filter(|hash| !hash.is_empty())
}
