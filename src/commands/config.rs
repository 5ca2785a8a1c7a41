use anyhow::{bail, Context as _, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::Context;
use crate::core::{Config, ConfigStore, LimitKind, StressLevel};
use crate::ui::formatters::{format_choices, format_range, hold_choices, lower_choices, upper_choices};

/// Settings addressable from `cycler config set`
enum Setting {
    Limit(LimitKind),
    CpuStress,
    GpuStress,
}

impl Setting {
    fn parse(key: &str) -> Result<Self> {
        let setting = match key.to_lowercase().replace('-', "_").as_str() {
            "upper" | "upper_limit" => Setting::Limit(LimitKind::Upper),
            "lower" | "lower_limit" => Setting::Limit(LimitKind::Lower),
            "pause" | "pause_limit" => Setting::Limit(LimitKind::Pause),
            "reset" | "reset_limit" => Setting::Limit(LimitKind::Reset),
            "cpu" | "cpu_stress" => Setting::CpuStress,
            "gpu" | "gpu_stress" => Setting::GpuStress,
            other => bail!(
                "Unknown setting '{}'. Valid keys: upper, lower, pause, reset, cpu, gpu",
                other
            ),
        };
        Ok(setting)
    }

    /// Validate and apply `value`, returning a description of the change
    fn apply(&self, config: &mut Config, value: &str) -> Result<String> {
        match self {
            Setting::Limit(kind) => {
                let percent: u32 = value
                    .trim()
                    .trim_end_matches('%')
                    .parse()
                    .with_context(|| format!("'{}' is not a percentage", value))?;
                kind.validate(percent)?;
                config.set_limit(*kind, percent);
                Ok(format!("{} set to {}%", kind.key(), percent))
            }
            Setting::CpuStress => {
                config.cpu_stress = value.parse::<StressLevel>()?;
                Ok(format!("cpu_stress set to {}", config.cpu_stress))
            }
            Setting::GpuStress => {
                config.gpu_stress = value.parse::<StressLevel>()?;
                Ok(format!("gpu_stress set to {}", config.gpu_stress))
            }
        }
    }
}

pub fn execute(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let store = ConfigStore::new(&ctx.paths.config_file);

    match matches.subcommand() {
        Some(("show", _)) => show(&store),
        Some(("set", sub_matches)) => {
            let key = sub_matches
                .get_one::<String>("key")
                .context("Key argument is required")?;
            let value = sub_matches
                .get_one::<String>("value")
                .context("Value argument is required")?;
            set(&store, key, value)
        }
        Some(("reset", _)) => {
            store
                .save(&Config::default())
                .with_context(|| format!("Failed to write {:?}", store.path()))?;
            println!("{}", "✓ Configuration reset to defaults".green());
            Ok(())
        }
        Some(("path", _)) => {
            println!("{}", store.path().display());
            Ok(())
        }
        _ => show(&store),
    }
}

pub fn set(store: &ConfigStore, key: &str, value: &str) -> Result<()> {
    let setting = Setting::parse(key)?;
    let mut config = store.load();
    let message = setting.apply(&mut config, value)?;

    store
        .save(&config)
        .with_context(|| format!("Failed to write {:?}", store.path()))?;

    println!("{} {}", "✓".green(), message);
    Ok(())
}

fn show(store: &ConfigStore) -> Result<()> {
    let config = store.load();

    println!("{} {}", "Config file:".white().bold(), store.path().display().to_string().dimmed());
    println!();

    let rows = [
        (LimitKind::Upper, upper_choices().collect::<Vec<_>>()),
        (LimitKind::Lower, lower_choices().collect()),
        (LimitKind::Pause, hold_choices().collect()),
        (LimitKind::Reset, hold_choices().collect()),
    ];

    for (kind, choices) in rows {
        let (min, max) = kind.domain();
        println!(
            "  {:<12} {:>4}  {}",
            kind.key().cyan(),
            format!("{}%", config.limit(kind)).yellow().bold(),
            format!("({})", format_range(min..=max)).dimmed()
        );
        println!("  {:<12} {}", "", format_choices(choices.into_iter(), config.limit(kind)).dimmed());
    }

    println!();
    println!("  {:<12} {}", "cpu_stress".cyan(), config.cpu_stress.title().yellow().bold());
    println!("  {:<12} {}", "gpu_stress".cyan(), config.gpu_stress.title().yellow().bold());

    let levels: Vec<&str> = StressLevel::ALL.iter().map(|l| l.as_str()).collect();
    println!("  {:<12} {}", "", format!("({})", levels.join(", ")).dimmed());

    Ok(())
}
