use anyhow::{Context as _, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::Context;
use crate::core::{CycleSessionController, OverrideRole};
use crate::platform::battery_cli::INSTALL_HINT;
use crate::ui;

/// `cycler pause <pct>` / `cycler reset <pct>`
pub fn execute(ctx: &Context, matches: &ArgMatches, role: OverrideRole) -> Result<()> {
    let percent = *matches
        .get_one::<u32>("percent")
        .context("Percent argument is required")?;
    role.limit().validate(percent)?;

    let mut controller = CycleSessionController::from_paths(&ctx.paths, ctx.runner.clone());
    if !controller.battery().is_available() {
        ui::warn("battery CLI not found; the hold request will not reach the SMC");
        ui::dimmed(&format!("Install it with:\n{}", INSTALL_HINT));
    }

    controller
        .override_to_percent(role, percent)
        .context("Failed to save configuration")?;

    println!("{}", hold_message(role, percent).green().bold());
    Ok(())
}

pub fn hold_message(role: OverrideRole, percent: u32) -> String {
    match role {
        OverrideRole::Pause => format!("Paused - holding at {}%", percent),
        OverrideRole::Reset => format!("Stopped - reset to {}% limit", percent),
    }
}
