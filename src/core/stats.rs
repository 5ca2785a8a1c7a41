//! Statistics report combining the OS figures with the session counters.
//!
//! Every field has its own fallback, so one missing source only blanks the
//! figures derived from it.

use serde::Serialize;

use super::config::{Config, StressLevel};
use super::counters::SessionCounters;
use super::status::{CapacityRegisters, PowerProfile, StatusProbe};

/// Placeholder for a figure that could not be determined
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    // Battery health
    pub apple_health: Option<String>,
    pub calculated_health: Option<u32>,
    pub capacity: Option<String>,
    pub condition: Option<String>,

    // Cycle counts
    pub apple_cycles: Option<String>,
    pub script_cycles: u64,
    pub cycles_added: Option<i64>,

    // Session time, in seconds
    pub total_active_secs: u64,
    pub total_discharge_secs: u64,
    pub total_charge_secs: u64,

    // Changes since the first run
    pub initial_health: Option<String>,
    pub health_change: Option<f64>,
    pub initial_apple_cycles: Option<String>,

    pub cpu_stress: StressLevel,
    pub gpu_stress: StressLevel,
}

impl StatsReport {
    /// Pure composition of the already-collected sources
    pub fn compose(
        profile: &PowerProfile,
        registers: &CapacityRegisters,
        counters: &SessionCounters,
        config: &Config,
    ) -> Self {
        let calculated_health = registers.health_percent();

        Self {
            apple_health: profile.maximum_capacity.clone(),
            calculated_health,
            capacity: registers.capacity_label(),
            condition: profile.condition.clone(),

            apple_cycles: profile.cycle_count.clone(),
            script_cycles: counters.total_discharge_cycles,
            cycles_added: cycles_added(
                profile.cycle_count.as_deref(),
                counters.initial_apple_cycles.as_deref(),
            ),

            total_active_secs: counters.total_active_secs,
            total_discharge_secs: counters.total_discharge_secs,
            total_charge_secs: counters.total_charge_secs,

            initial_health: counters.initial_health.clone(),
            health_change: health_change(
                counters.initial_health.as_deref(),
                calculated_health.map(f64::from),
            ),
            initial_apple_cycles: counters.initial_apple_cycles.clone(),

            cpu_stress: config.cpu_stress,
            gpu_stress: config.gpu_stress,
        }
    }

    pub fn apple_health_display(&self) -> String {
        or_na(self.apple_health.clone())
    }

    pub fn calculated_health_display(&self) -> String {
        or_na(self.calculated_health.map(|h| format!("{}%", h)))
    }

    pub fn capacity_display(&self) -> String {
        or_na(self.capacity.clone())
    }

    pub fn condition_display(&self) -> String {
        or_na(self.condition.clone())
    }

    pub fn apple_cycles_display(&self) -> String {
        or_na(self.apple_cycles.clone())
    }

    pub fn cycles_added_display(&self) -> String {
        or_na(self.cycles_added.map(|n| n.to_string()))
    }

    pub fn initial_health_display(&self) -> String {
        or_na(
            self.initial_health
                .as_ref()
                .map(|h| format!("{}%", h.trim_end_matches('%'))),
        )
    }

    pub fn health_change_display(&self) -> String {
        or_na(self.health_change.map(format_delta))
    }

    pub fn initial_apple_cycles_display(&self) -> String {
        or_na(self.initial_apple_cycles.clone())
    }
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Builds [`StatsReport`]s from live OS queries.
pub struct StatsAggregator<'a> {
    probe: &'a StatusProbe,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(probe: &'a StatusProbe) -> Self {
        Self { probe }
    }

    pub fn build_report(&self, config: &Config, counters: &SessionCounters) -> StatsReport {
        let profile = self.probe.power_profile();
        let registers = self.probe.capacity_registers();
        StatsReport::compose(&profile, &registers, counters, config)
    }

    /// Read the session-counter file and build the report from it
    pub fn collect(&self, config: &Config) -> StatsReport {
        let counters = SessionCounters::load(&self.probe.paths().state_file);
        self.build_report(config, &counters)
    }
}

/// OS cycle count minus the baseline, when both are integers
pub fn cycles_added(apple_cycles: Option<&str>, initial: Option<&str>) -> Option<i64> {
    let current = apple_cycles?.trim().parse::<i64>().ok()?;
    let initial = initial?.trim().trim_end_matches('%').parse::<i64>().ok()?;
    Some(current - initial)
}

/// Current health minus the baseline, rounded to one decimal
pub fn health_change(initial: Option<&str>, current: Option<f64>) -> Option<f64> {
    let initial = initial?.trim().trim_end_matches('%').parse::<f64>().ok()?;
    let diff = current? - initial;
    Some((diff * 10.0).round() / 10.0)
}

/// Signed percent with an explicit `+` for non-negative deltas: `+1.3%`, `-1.0%`
pub fn format_delta(delta: f64) -> String {
    // A delta that rounded to -0.0 prints as +0.0
    let delta = if delta == 0.0 { 0.0 } else { delta };
    let sign = if delta >= 0.0 { "+" } else { "" };
    format!("{}{:.1}%", sign, delta)
}

/// `"<h>h <m>m"` from one hour up, `"<m>m"` below. Minutes truncate.
pub fn fmt_time(secs: u64) -> String {
    if secs == 0 {
        return "0m".to_string();
    }

    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_time() {
        assert_eq!(fmt_time(0), "0m");
        assert_eq!(fmt_time(59), "0m");
        assert_eq!(fmt_time(90), "1m");
        assert_eq!(fmt_time(3600), "1h 0m");
        assert_eq!(fmt_time(3661), "1h 1m");
        assert_eq!(fmt_time(7199), "1h 59m");
    }

    #[test]
    fn test_health_change_formatting() {
        let up = health_change(Some("75.0"), Some(76.3)).unwrap();
        assert_eq!(format_delta(up), "+1.3%");

        let down = health_change(Some("80.0"), Some(79.0)).unwrap();
        assert_eq!(format_delta(down), "-1.0%");

        assert_eq!(format_delta(0.0), "+0.0%");
    }

    #[test]
    fn test_health_change_needs_both_values() {
        assert_eq!(health_change(None, Some(80.0)), None);
        assert_eq!(health_change(Some("88"), None), None);
        assert_eq!(health_change(Some("unknown"), Some(80.0)), None);
    }

    #[test]
    fn test_cycles_added() {
        assert_eq!(cycles_added(Some("412"), Some("400")), Some(12));
        assert_eq!(cycles_added(Some("412"), None), None);
        assert_eq!(cycles_added(None, Some("400")), None);
        assert_eq!(cycles_added(Some("lots"), Some("400")), None);
    }

    #[test]
    fn test_compose_with_counter_file_only() {
        let counters = SessionCounters::parse("TOTAL_DISCHARGE_CYCLES=42\nINITIAL_HEALTH=\"88\"\n");
        let report = StatsReport::compose(
            &PowerProfile::default(),
            &CapacityRegisters::default(),
            &counters,
            &Config::default(),
        );

        assert_eq!(report.script_cycles, 42);
        assert_eq!(report.initial_health_display(), "88%");
        assert_eq!(fmt_time(report.total_active_secs), "0m");
        assert_eq!(fmt_time(report.total_discharge_secs), "0m");
        assert_eq!(fmt_time(report.total_charge_secs), "0m");
        assert_eq!(report.calculated_health_display(), "N/A");
        assert_eq!(report.health_change_display(), "N/A");
        assert_eq!(report.cycles_added_display(), "N/A");
    }

    #[test]
    fn test_compose_full_sources() {
        let profile = PowerProfile {
            maximum_capacity: Some("87%".into()),
            condition: Some("Normal".into()),
            cycle_count: Some("412".into()),
        };
        let registers = CapacityRegisters {
            nominal: Some(3812),
            design: Some(4382),
        };
        let counters = SessionCounters {
            initial_health: Some("88".into()),
            initial_apple_cycles: Some("400".into()),
            ..Default::default()
        };

        let report = StatsReport::compose(&profile, &registers, &counters, &Config::default());
        assert_eq!(report.calculated_health_display(), "87%");
        assert_eq!(report.capacity_display(), "3812/4382 mAh");
        assert_eq!(report.cycles_added_display(), "12");
        assert_eq!(report.health_change_display(), "-1.0%");
        assert_eq!(report.cpu_stress, StressLevel::High);
    }
}
