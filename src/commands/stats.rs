use anyhow::{Context as _, Result};
use clap::ArgMatches;

use super::Context;
use crate::core::{ConfigStore, StatsAggregator};
use crate::ui::{self, render_report};

pub fn execute(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let config = ConfigStore::new(&ctx.paths.config_file).load();
    let probe = ctx.probe();
    let report = StatsAggregator::new(&probe).collect(&config);

    if matches.get_flag("json") {
        let text = serde_json::to_string_pretty(&report).context("Failed to encode statistics")?;
        println!("{}", text);
        return Ok(());
    }

    ui::heading("Battery Cycler Stats");
    println!();
    println!("{}", render_report(&report));
    Ok(())
}
