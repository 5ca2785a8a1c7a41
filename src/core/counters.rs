//! Session counters persisted by the external cycling script.
//!
//! The file is plain `KEY=VALUE` lines, sometimes with quoted values. It is
//! owned by the script; this side only ever reads it, and reads it
//! forgivingly: every field is extracted on its own and a bad line only
//! costs that one field.

use serde::Serialize;
use std::fs;
use std::path::Path;

pub const KEY_DISCHARGE_CYCLES: &str = "TOTAL_DISCHARGE_CYCLES";
pub const KEY_INITIAL_HEALTH: &str = "INITIAL_HEALTH";
pub const KEY_INITIAL_APPLE_CYCLES: &str = "INITIAL_APPLE_CYCLES";
pub const KEY_ACTIVE_SECS: &str = "TOTAL_ACTIVE_SECS";
pub const KEY_DISCHARGE_SECS: &str = "TOTAL_DISCHARGE_SECS";
pub const KEY_CHARGE_SECS: &str = "TOTAL_CHARGE_SECS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    pub total_discharge_cycles: u64,
    /// Health percent captured on first run, without the `%` sign
    pub initial_health: Option<String>,
    pub initial_apple_cycles: Option<String>,
    pub total_active_secs: u64,
    pub total_discharge_secs: u64,
    pub total_charge_secs: u64,
}

impl SessionCounters {
    /// Read the counter file; a missing or unreadable file yields all defaults
    pub fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                log::debug!("No session counters at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut counters = Self::default();

        for line in text.lines() {
            let Some((key, raw)) = line.split_once('=') else {
                continue;
            };

            match key.trim() {
                KEY_DISCHARGE_CYCLES => {
                    if let Some(n) = parse_count(key, raw) {
                        counters.total_discharge_cycles = n;
                    }
                }
                KEY_INITIAL_HEALTH => {
                    if let Some(v) = parse_text(raw) {
                        counters.initial_health = Some(v);
                    }
                }
                KEY_INITIAL_APPLE_CYCLES => {
                    if let Some(v) = parse_text(raw) {
                        counters.initial_apple_cycles = Some(v);
                    }
                }
                KEY_ACTIVE_SECS => {
                    if let Some(n) = parse_count(key, raw) {
                        counters.total_active_secs = n;
                    }
                }
                KEY_DISCHARGE_SECS => {
                    if let Some(n) = parse_count(key, raw) {
                        counters.total_discharge_secs = n;
                    }
                }
                KEY_CHARGE_SECS => {
                    if let Some(n) = parse_count(key, raw) {
                        counters.total_charge_secs = n;
                    }
                }
                _ => {}
            }
        }

        counters
    }
}

fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

fn parse_count(key: &str, raw: &str) -> Option<u64> {
    match unquote(raw).parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            log::debug!("Skipping malformed counter {}={:?}", key.trim(), raw);
            None
        }
    }
}

fn parse_text(raw: &str) -> Option<String> {
    let value = unquote(raw);
    (!value.is_empty()).then(|| value.to_string())
}
