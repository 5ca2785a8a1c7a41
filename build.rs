use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=CYCLER_BUILD_COMMIT");

    // An explicit value wins (release pipelines build from a tarball without .git)
    if let Ok(commit) = std::env::var("CYCLER_BUILD_COMMIT") {
        println!("cargo:rustc-env=CYCLER_BUILD_COMMIT={}", commit);
        return;
    }

    let commit = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=CYCLER_BUILD_COMMIT={}", commit);
}
