use anyhow::{Context as _, Result};
use clap::ArgMatches;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::Command;

use super::Context;
use crate::ui;

pub fn execute(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let log_file = &ctx.paths.log_file;
    let lines = matches.get_one::<usize>("lines").copied().unwrap_or(20);

    if !log_file.exists() {
        ui::warn(&format!("No log file at {}", log_file.display()));
        ui::dimmed("The cycling script creates it on its first run.");
        return Ok(());
    }

    if matches.get_flag("follow") {
        return follow(log_file);
    }

    for line in tail(log_file, lines)? {
        println!("{}", line);
    }
    Ok(())
}

/// Last `count` lines of the file
pub fn tail(path: &Path, count: usize) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut window = VecDeque::with_capacity(count);

    for line in BufReader::new(file).split(b'\n') {
        let line = line.with_context(|| format!("Failed to read {:?}", path))?;
        if window.len() == count {
            window.pop_front();
        }
        if count > 0 {
            window.push_back(String::from_utf8_lossy(&line).into_owned());
        }
    }

    Ok(window.into())
}

/// macOS: `tail -f` in a new Terminal window. Elsewhere: `tail -f` in this terminal.
fn follow(path: &Path) -> Result<()> {
    if cfg!(target_os = "macos") {
        let script = format!(
            "tell application \"Terminal\"\n    activate\n    do script \"tail -f '{}'\"\nend tell",
            path.display()
        );
        Command::new("osascript")
            .args(["-e", &script])
            .status()
            .context("Failed to open Terminal")?;
        return Ok(());
    }

    Command::new("tail")
        .arg("-f")
        .arg(path)
        .status()
        .context("Failed to run tail")?;
    Ok(())
}
