use std::ops::RangeInclusive;

use crate::core::poller::StatusSnapshot;
use crate::core::session::SessionState;
use crate::core::stats::{fmt_time, StatsReport};

/// Percent choices offered for "pause at" and "stop & reset to"
pub fn hold_choices() -> impl Iterator<Item = u32> {
    (20..=100).step_by(5)
}

/// Percent choices offered for the upper limit
pub fn upper_choices() -> impl Iterator<Item = u32> {
    (50..=100).step_by(10)
}

/// Percent choices offered for the lower limit
pub fn lower_choices() -> impl Iterator<Item = u32> {
    (10..=50).step_by(10)
}

pub fn format_choices(choices: impl Iterator<Item = u32>, selected: u32) -> String {
    choices
        .map(|c| {
            if c == selected {
                format!("[{}%]", c)
            } else {
                format!("{}%", c)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_range(range: RangeInclusive<u32>) -> String {
    format!("{}-{}%", range.start(), range.end())
}

/// Menu-bar style title: power glyph plus percent
pub fn format_title(percent: u8, charging: bool) -> String {
    let glyph = if charging { "⚡" } else { "🔋" };
    format!("{} {}%", glyph, percent)
}

pub fn format_session_status(state: SessionState) -> &'static str {
    match state {
        SessionState::Active => "Status: Cycling Active",
        SessionState::Idle => "Status: Idle",
    }
}

/// Label of the action a toggle would perform next
pub fn format_toggle_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Active => "Stop Cycling",
        SessionState::Idle => "Start Cycling",
    }
}

pub fn format_info(cycles: u64, health: &str) -> String {
    format!("Cycles: {} | Health: {}", cycles, health)
}

pub fn format_snapshot(snapshot: &StatusSnapshot) -> String {
    format!(
        "{}  {}  {}",
        format_title(snapshot.percent, snapshot.charging),
        format_session_status(snapshot.session),
        format_info(snapshot.cycles, &snapshot.health)
    )
}

/// Plain-ASCII statistics block, one section per concern
pub fn render_report(report: &StatsReport) -> String {
    let lines = [
        "=== BATTERY HEALTH ===".to_string(),
        format!("Apple Reported: {}", report.apple_health_display()),
        format!("Calculated: {}", report.calculated_health_display()),
        format!("Capacity: {}", report.capacity_display()),
        format!("Condition: {}", report.condition_display()),
        String::new(),
        "=== CYCLE COUNTS ===".to_string(),
        format!("Apple Cycles: {}", report.apple_cycles_display()),
        format!("App Cycles: {}", report.script_cycles),
        format!("Apple Cycles Added: {}", report.cycles_added_display()),
        String::new(),
        "=== SESSION STATS ===".to_string(),
        format!("Total Active: {}", fmt_time(report.total_active_secs)),
        format!("Time Discharging: {}", fmt_time(report.total_discharge_secs)),
        format!("Time Charging: {}", fmt_time(report.total_charge_secs)),
        String::new(),
        "=== CHANGES ===".to_string(),
        format!("Initial Health: {}", report.initial_health_display()),
        format!("Health Change: {}", report.health_change_display()),
        format!("Initial Cycles: {}", report.initial_apple_cycles_display()),
        String::new(),
        "=== SETTINGS ===".to_string(),
        format!("CPU: {}  GPU: {}", report.cpu_stress, report.gpu_stress),
    ];
    lines.join("\n")
}
