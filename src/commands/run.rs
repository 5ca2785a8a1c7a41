//! Interactive host for a cycling session.
//!
//! One thread owns the controller and handles, in arrival order, refresh
//! ticks, command lines typed on stdin and Ctrl+C. Nothing else touches the
//! controller, so refreshes and user actions never overlap.

use anyhow::{anyhow, bail, Context as _, Result};
use colored::Colorize;
use std::io::BufRead;
use std::sync::mpsc::{self, Sender};

use super::hold::hold_message;
use super::Context;
use crate::core::poller::{self, RefreshTimer, REFRESH_PERIOD};
use crate::core::version::version_string;
use crate::core::{
    CycleSessionController, LimitKind, OverrideRole, SessionState, StatsAggregator, StatusProbe,
    StressLevel,
};
use crate::platform::battery_cli::INSTALL_HINT;
use crate::ui::{self, format_snapshot, format_toggle_label, render_report};

#[derive(Debug, Clone)]
enum Event {
    Tick,
    Input(String),
    InputClosed,
    Interrupt,
}

/// A command line typed into the run loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Toggle,
    Start,
    Stop,
    Hold(OverrideRole, u32),
    Limit(LimitKind, u32),
    CpuStress(StressLevel),
    GpuStress(StressLevel),
    Stats,
    Status,
    Help,
    Quit,
}

impl HostCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| anyhow!("empty command"))?
            .to_lowercase();
        let arg = words.next();

        let percent = |arg: Option<&str>| -> Result<u32> {
            let raw = arg.ok_or_else(|| anyhow!("'{}' needs a percentage", verb))?;
            raw.trim_end_matches('%')
                .parse::<u32>()
                .with_context(|| format!("'{}' is not a percentage", raw))
        };
        let level = |arg: Option<&str>| -> Result<StressLevel> {
            let raw = arg.ok_or_else(|| anyhow!("'{}' needs off, low, medium or high", verb))?;
            Ok(raw.parse::<StressLevel>()?)
        };

        let command = match verb.as_str() {
            "toggle" | "t" => HostCommand::Toggle,
            "start" => HostCommand::Start,
            "stop" => HostCommand::Stop,
            "pause" => HostCommand::Hold(OverrideRole::Pause, percent(arg)?),
            "reset" => HostCommand::Hold(OverrideRole::Reset, percent(arg)?),
            "upper" => HostCommand::Limit(LimitKind::Upper, percent(arg)?),
            "lower" => HostCommand::Limit(LimitKind::Lower, percent(arg)?),
            "cpu" => HostCommand::CpuStress(level(arg)?),
            "gpu" => HostCommand::GpuStress(level(arg)?),
            "stats" => HostCommand::Stats,
            "status" | "s" => HostCommand::Status,
            "help" | "h" | "?" => HostCommand::Help,
            "quit" | "q" | "exit" => HostCommand::Quit,
            other => bail!("unknown command '{}' (type 'help')", other),
        };
        Ok(command)
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Host {
    controller: CycleSessionController,
    probe: StatusProbe,
    /// Percent handed to `battery maintain` by the last pause/reset, until a session starts again
    holding: Option<u32>,
    last_line: Option<String>,
}

impl Host {
    fn refresh(&mut self, force: bool) {
        let snapshot = poller::snapshot(&self.probe, &mut self.controller);

        let mut line = format_snapshot(&snapshot);
        if snapshot.session == SessionState::Idle {
            if let Some(percent) = self.holding {
                line.push_str(&format!("  (holding at {}%)", percent));
            }
        }

        if force || self.last_line.as_deref() != Some(line.as_str()) {
            println!("{}", line);
            self.last_line = Some(line);
        }
    }

    fn handle(&mut self, command: HostCommand) -> Result<Flow> {
        match command {
            HostCommand::Toggle => {
                match self.controller.toggle().context("Failed to start cycling")? {
                    SessionState::Active => {
                        self.holding = None;
                        ui::success("Cycling started");
                    }
                    SessionState::Idle => ui::success("Cycling stopped"),
                }
                self.refresh(true);
            }
            HostCommand::Start => {
                if self.controller.is_active() {
                    ui::dimmed("Cycling is already running");
                } else {
                    self.handle(HostCommand::Toggle)?;
                }
            }
            HostCommand::Stop => {
                if self.controller.is_active() {
                    self.handle(HostCommand::Toggle)?;
                } else {
                    ui::dimmed("Cycling is not running");
                }
            }
            HostCommand::Hold(role, percent) => {
                role.limit().validate(percent)?;
                self.controller
                    .override_to_percent(role, percent)
                    .context("Failed to save configuration")?;
                self.holding = Some(percent);
                ui::success(&hold_message(role, percent));
                self.refresh(true);
            }
            HostCommand::Limit(kind, percent) => {
                self.controller
                    .set_limit(kind, percent)
                    .with_context(|| format!("Failed to set {}", kind.key()))?;
                ui::success(&format!("{} set to {}%", kind.key(), percent));
            }
            HostCommand::CpuStress(level) => {
                self.controller.set_cpu_stress(level)?;
                ui::success(&format!("CPU Stress: {}", level));
            }
            HostCommand::GpuStress(level) => {
                self.controller.set_gpu_stress(level)?;
                ui::success(&format!("GPU Stress: {}", level));
            }
            HostCommand::Stats => {
                let report = StatsAggregator::new(&self.probe).collect(self.controller.config());
                println!("{}", render_report(&report));
            }
            HostCommand::Status => self.refresh(true),
            HostCommand::Help => print_help(self.controller.state()),
            HostCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

pub fn execute(ctx: &Context) -> Result<()> {
    let controller = CycleSessionController::from_paths(&ctx.paths, ctx.runner.clone());

    ui::heading(&format!("Battery Cycler {}", version_string(ctx.runner.as_ref())));
    if !controller.battery().is_available() {
        ui::warn("battery CLI not found");
        ui::dimmed(&format!("Install it with:\n{}", INSTALL_HINT));
    }

    let (tx, rx) = mpsc::channel::<Event>();

    let interrupt_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(Event::Interrupt);
    })
    .map_err(|e| anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    spawn_stdin_reader(tx.clone())?;
    let mut timer = RefreshTimer::start(REFRESH_PERIOD, tx, Event::Tick)
        .context("Failed to start refresh timer")?;

    let mut host = Host {
        controller,
        probe: ctx.probe(),
        holding: None,
        last_line: None,
    };

    print_help(host.controller.state());
    host.refresh(true);

    for event in rx {
        match event {
            Event::Tick => {
                host.refresh(false);
                timer.acknowledge();
            }
            Event::Input(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let outcome = HostCommand::parse(&line).and_then(|command| host.handle(command));
                match outcome {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => ui::error(&format!("Error: {:#}", e)),
                }
            }
            Event::InputClosed => {
                log::debug!("stdin closed; running until interrupted");
            }
            Event::Interrupt => {
                println!();
                break;
            }
        }
    }

    timer.cancel();
    if host.controller.is_active() {
        ui::dimmed("Stopping cycling session...");
    }
    host.controller.shutdown();
    Ok(())
}

fn spawn_stdin_reader(tx: Sender<Event>) -> Result<()> {
    std::thread::Builder::new()
        .name("cycler-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(Event::Input(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(Event::InputClosed);
        })
        .context("Failed to start input reader")?;
    Ok(())
}

fn print_help(state: SessionState) {
    println!("{}", "Commands:".white().bold());
    println!("  {:<14} {}", "toggle".cyan(), format_toggle_label(state));
    println!("  {:<14} {}", "pause <pct>".cyan(), "Stop and hold at <pct> (20-100)");
    println!("  {:<14} {}", "reset <pct>".cyan(), "Stop and reset to <pct> (20-100)");
    println!("  {:<14} {}", "upper <pct>".cyan(), "Set upper limit (50-100)");
    println!("  {:<14} {}", "lower <pct>".cyan(), "Set lower limit (10-50)");
    println!("  {:<14} {}", "cpu <level>".cyan(), "CPU stress: off, low, medium, high");
    println!("  {:<14} {}", "gpu <level>".cyan(), "GPU stress: off, low, medium, high");
    println!("  {:<14} {}", "stats".cyan(), "Show statistics");
    println!("  {:<14} {}", "status".cyan(), "Refresh status now");
    println!("  {:<14} {}", "quit".cyan(), "Stop cycling and exit");
}
