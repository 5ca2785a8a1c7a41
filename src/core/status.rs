//! Battery status probes.
//!
//! Three OS sources are read, each through its own best-effort parser:
//! `pmset -g batt` for the live percent and power source,
//! `system_profiler SPPowerDataType` for the OS-reported health figures, and
//! `ioreg -rn AppleSmartBattery` for raw capacity registers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::counters::SessionCounters;
use super::paths::AppPaths;
use crate::platform::CommandRunner;

const PMSET_TIMEOUT: Duration = Duration::from_secs(5);
const PROFILER_TIMEOUT: Duration = Duration::from_secs(10);
const IOREG_TIMEOUT: Duration = Duration::from_secs(5);

/// Shown in place of the health figure when the OS report has none
pub const HEALTH_PLACEHOLDER: &str = "--";

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").expect("valid regex"));
// Whole word only: "discharging" must not read as charging
static CHARGING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcharging\b").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatterySnapshot {
    pub percent: u8,
    pub charging: bool,
}

impl BatterySnapshot {
    /// Parse `pmset -g batt` text; anything without a percentage is the fallback
    pub fn parse(text: &str) -> Self {
        let percent = PERCENT_RE
            .captures(text)
            .and_then(|caps| caps[1].parse::<u8>().ok())
            .filter(|p| *p <= 100);

        match percent {
            Some(percent) => Self {
                percent,
                charging: CHARGING_RE.is_match(text) || text.contains("AC Power"),
            },
            None => Self::default(),
        }
    }
}

/// Fields of interest from the OS power-data report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PowerProfile {
    pub maximum_capacity: Option<String>,
    pub condition: Option<String>,
    pub cycle_count: Option<String>,
}

impl PowerProfile {
    pub fn parse(text: &str) -> Self {
        Self {
            maximum_capacity: profile_field(text, "Maximum Capacity"),
            condition: profile_field(text, "Condition"),
            cycle_count: profile_field(text, "Cycle Count"),
        }
    }
}

/// Value after the last `:` on the first line mentioning `label`
fn profile_field(text: &str, label: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| line.contains(label) && line.contains(':'))
        .and_then(|line| line.rsplit(':').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Raw capacity registers, in mAh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapacityRegisters {
    pub nominal: Option<u64>,
    pub design: Option<u64>,
}

impl CapacityRegisters {
    pub fn parse(text: &str) -> Self {
        Self {
            nominal: register_value(text, "\"NominalChargeCapacity\""),
            design: register_value(text, "\"DesignCapacity\""),
        }
    }

    /// `nominal * 100 / design`, rounded; `None` without both figures or with a zero design
    pub fn health_percent(&self) -> Option<u32> {
        match (self.nominal, self.design) {
            (Some(nominal), Some(design)) if design > 0 => {
                Some((nominal as f64 * 100.0 / design as f64).round() as u32)
            }
            _ => None,
        }
    }

    pub fn capacity_label(&self) -> Option<String> {
        self.health_percent()?;
        Some(format!("{}/{} mAh", self.nominal?, self.design?))
    }
}

/// Last parsable `<key> = <int>` line wins; nested dictionaries that merely
/// mention the key do not parse and are skipped
fn register_value(text: &str, key: &str) -> Option<u64> {
    text.lines()
        .filter(|line| line.contains(key) && line.contains('='))
        .filter_map(|line| line.rsplit('=').next()?.trim().parse::<u64>().ok())
        .last()
}

/// Queries the OS and the session-counter file for the polled status figures.
#[derive(Clone)]
pub struct StatusProbe {
    runner: Arc<dyn CommandRunner>,
    paths: AppPaths,
}

impl StatusProbe {
    pub fn new(runner: Arc<dyn CommandRunner>, paths: AppPaths) -> Self {
        Self { runner, paths }
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// Current percent and charging state; `(0, false)` on any failure
    pub fn battery_snapshot(&self) -> BatterySnapshot {
        self.runner
            .run("pmset", &["-g", "batt"], PMSET_TIMEOUT)
            .and_then(|output| output.into_stdout())
            .map(|text| BatterySnapshot::parse(&text))
            .unwrap_or_default()
    }

    /// Script cycle count and OS-reported health.
    ///
    /// The two lookups are independent: a missing counter file still yields
    /// the health figure and a hung profiler still yields the count.
    pub fn cycle_and_health(&self) -> (u64, String) {
        let cycles = SessionCounters::load(&self.paths.state_file).total_discharge_cycles;
        let health = self
            .power_profile()
            .maximum_capacity
            .unwrap_or_else(|| HEALTH_PLACEHOLDER.to_string());
        (cycles, health)
    }

    pub fn power_profile(&self) -> PowerProfile {
        self.runner
            .run("system_profiler", &["SPPowerDataType"], PROFILER_TIMEOUT)
            .map(|output| PowerProfile::parse(&output.stdout))
            .unwrap_or_default()
    }

    pub fn capacity_registers(&self) -> CapacityRegisters {
        self.runner
            .run("ioreg", &["-rn", "AppleSmartBattery"], IOREG_TIMEOUT)
            .map(|output| CapacityRegisters::parse(&output.stdout))
            .unwrap_or_default()
    }
}
