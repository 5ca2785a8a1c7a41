use anyhow::{Context as _, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::Context;
use crate::core::{ConfigStore, SessionState};
use crate::ui::formatters::{format_info, format_session_status, format_title};

pub fn execute(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let probe = ctx.probe();
    let battery = probe.battery_snapshot();
    let (cycles, health) = probe.cycle_and_health();
    let config = ConfigStore::new(&ctx.paths.config_file).load();

    if matches.get_flag("json") {
        let value = serde_json::json!({
            "percent": battery.percent,
            "charging": battery.charging,
            "cycles": cycles,
            "health": health,
            "config": config,
        });
        let text = serde_json::to_string_pretty(&value).context("Failed to encode status")?;
        println!("{}", text);
        return Ok(());
    }

    // A one-shot invocation never owns a session; `cycler run` does
    println!("{}", format_title(battery.percent, battery.charging).bold());
    println!("{}", format_session_status(SessionState::Idle).dimmed());
    println!("{}", format_info(cycles, &health).cyan());
    println!();
    println!(
        "{} {}%  {} {}%",
        "Upper:".white(),
        config.upper_limit.to_string().yellow(),
        "Lower:".white(),
        config.lower_limit.to_string().yellow()
    );
    println!(
        "{} {}  {} {}",
        "CPU stress:".white(),
        config.cpu_stress.title().yellow(),
        "GPU stress:".white(),
        config.gpu_stress.title().yellow()
    );

    Ok(())
}
