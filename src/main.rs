use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use cycler::commands::{self, Context};
use cycler::core::OverrideRole;

fn build_cli() -> Command {
    Command::new("cycler")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Battery conditioning controller: cycles the battery between limits and reports health")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("run")
                .about("Run the interactive controller (start/stop cycling, live status)"),
        )
        .subcommand(
            Command::new("status")
                .about("Show battery percent, charging state, cycles and health")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Show battery health, cycle and session statistics")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("pause")
                .about("Stop cycling and hold the battery at a percentage")
                .arg(percent_arg()),
        )
        .subcommand(
            Command::new("reset")
                .about("Stop cycling and reset the battery to a percentage")
                .arg(percent_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change cycling settings (use 'cycler config --help' for subcommands)")
                .subcommand(Command::new("show").about("Show current settings"))
                .subcommand(
                    Command::new("set")
                        .about("Set a value: upper, lower, pause, reset (percent) or cpu, gpu (off|low|medium|high)")
                        .arg(Arg::new("key").help("Setting name").required(true).index(1))
                        .arg(Arg::new("value").help("New value").required(true).index(2)),
                )
                .subcommand(Command::new("reset").about("Restore default settings"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
        .subcommand(
            Command::new("log")
                .about("Show the cycling log")
                .arg(
                    Arg::new("lines")
                        .short('n')
                        .long("lines")
                        .help("Number of lines to show")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    Arg::new("follow")
                        .short('f')
                        .long("follow")
                        .help("Keep following the log")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Shell: bash, zsh, fish, powershell, elvish")
                        .required(true)
                        .index(1),
                ),
        )
}

fn percent_arg() -> Arg {
    Arg::new("percent")
        .help("Target percentage (20-100)")
        .required(true)
        .index(1)
        .value_parser(clap::value_parser!(u32))
}

fn main() {
    if let Err(e) = run() {
        cycler::ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    cycler::init_logging(matches.get_flag("verbose"));

    if let Some(("completions", sub_matches)) = matches.subcommand() {
        return commands::completions::execute(sub_matches, &mut build_cli());
    }

    let ctx = Context::discover()?;

    match matches.subcommand() {
        Some(("run", _)) => commands::run::execute(&ctx),
        Some(("status", sub_matches)) => commands::status::execute(&ctx, sub_matches),
        Some(("stats", sub_matches)) => commands::stats::execute(&ctx, sub_matches),
        Some(("pause", sub_matches)) => {
            commands::hold::execute(&ctx, sub_matches, OverrideRole::Pause)
        }
        Some(("reset", sub_matches)) => {
            commands::hold::execute(&ctx, sub_matches, OverrideRole::Reset)
        }
        Some(("config", sub_matches)) => commands::config::execute(&ctx, sub_matches),
        Some(("log", sub_matches)) => commands::logs::execute(&ctx, sub_matches),
        Some(("version", _)) => commands::version::execute(&ctx),
        _ => {
            println!("Welcome to cycler!");
            println!("Use 'cycler --help' for more information.");
            Ok(())
        }
    }
}
