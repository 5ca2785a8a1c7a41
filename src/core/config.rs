use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CyclerError, Result};

pub const DEFAULT_UPPER_LIMIT: u32 = 80;
pub const DEFAULT_LOWER_LIMIT: u32 = 20;
pub const DEFAULT_PAUSE_LIMIT: u32 = 50;
pub const DEFAULT_RESET_LIMIT: u32 = 80;

/// Load generated by the stress helpers while a session discharges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Off,
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub const ALL: [StressLevel; 4] = [
        StressLevel::Off,
        StressLevel::Low,
        StressLevel::Medium,
        StressLevel::High,
    ];

    /// Lowercase form stored in the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Off => "off",
            StressLevel::Low => "low",
            StressLevel::Medium => "medium",
            StressLevel::High => "high",
        }
    }

    /// Title-cased form shown to the user
    pub fn title(&self) -> &'static str {
        match self {
            StressLevel::Off => "Off",
            StressLevel::Low => "Low",
            StressLevel::Medium => "Medium",
            StressLevel::High => "High",
        }
    }

    /// Legacy configs stored stress as a plain on/off boolean
    pub fn from_legacy(enabled: bool) -> Self {
        if enabled {
            StressLevel::High
        } else {
            StressLevel::Off
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for StressLevel {
    type Err = CyclerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(StressLevel::Off),
            "low" => Ok(StressLevel::Low),
            "medium" => Ok(StressLevel::Medium),
            "high" => Ok(StressLevel::High),
            other => Err(CyclerError::config(format!(
                "Unknown stress level '{}' (expected off, low, medium or high)",
                other
            ))),
        }
    }
}

/// The percent-valued settings and the range each one accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Upper,
    Lower,
    Pause,
    Reset,
}

impl LimitKind {
    pub fn key(&self) -> &'static str {
        match self {
            LimitKind::Upper => "upper_limit",
            LimitKind::Lower => "lower_limit",
            LimitKind::Pause => "pause_limit",
            LimitKind::Reset => "reset_limit",
        }
    }

    /// Inclusive domain of the setting
    pub fn domain(&self) -> (u32, u32) {
        match self {
            LimitKind::Upper => (50, 100),
            LimitKind::Lower => (10, 50),
            LimitKind::Pause | LimitKind::Reset => (20, 100),
        }
    }

    pub fn validate(&self, value: u32) -> Result<u32> {
        let (min, max) = self.domain();
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(CyclerError::config(format!(
                "{} must be between {}% and {}% (got {}%)",
                self.key(),
                min,
                max,
                value
            )))
        }
    }
}

/// Persisted cycling configuration.
///
/// Keys not known to this version are carried in `extra` so a save never
/// drops settings written by a newer release or by the cycling script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub upper_limit: u32,
    pub lower_limit: u32,
    pub pause_limit: u32,
    pub reset_limit: u32,
    pub cpu_stress: StressLevel,
    pub gpu_stress: StressLevel,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upper_limit: DEFAULT_UPPER_LIMIT,
            lower_limit: DEFAULT_LOWER_LIMIT,
            pause_limit: DEFAULT_PAUSE_LIMIT,
            reset_limit: DEFAULT_RESET_LIMIT,
            cpu_stress: StressLevel::High,
            gpu_stress: StressLevel::Off,
            extra: Map::new(),
        }
    }
}

impl Config {
    pub fn limit(&self, kind: LimitKind) -> u32 {
        match kind {
            LimitKind::Upper => self.upper_limit,
            LimitKind::Lower => self.lower_limit,
            LimitKind::Pause => self.pause_limit,
            LimitKind::Reset => self.reset_limit,
        }
    }

    pub fn set_limit(&mut self, kind: LimitKind, value: u32) {
        match kind {
            LimitKind::Upper => self.upper_limit = value,
            LimitKind::Lower => self.lower_limit = value,
            LimitKind::Pause => self.pause_limit = value,
            LimitKind::Reset => self.reset_limit = value,
        }
    }

    /// Parse a raw JSON record, filling missing keys from defaults,
    /// migrating legacy stress booleans and resetting invalid values
    pub fn from_record(record: Map<String, Value>) -> Result<Self> {
        let record = replace_invalid(migrate(merge_defaults(record)));
        Ok(serde_json::from_value(Value::Object(record))?)
    }
}

fn default_record() -> Map<String, Value> {
    match serde_json::to_value(Config::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Fill every key missing from `record` with its default value
pub fn merge_defaults(mut record: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in default_record() {
        record.entry(key).or_insert(value);
    }

    record
}

/// Reset each known key whose value does not fit its type back to the default.
///
/// Other keys are left untouched, so one bad field never costs the rest of the file.
pub fn replace_invalid(mut record: Map<String, Value>) -> Map<String, Value> {
    for (key, default) in default_record() {
        let Some(value) = record.get(&key) else {
            continue;
        };

        let valid = if key.ends_with("_stress") {
            StressLevel::deserialize(value).is_ok()
        } else {
            u32::deserialize(value).is_ok()
        };

        if !valid {
            log::warn!("Invalid {} {} in config, using default {}", key, value, default);
            record.insert(key, default);
        }
    }

    record
}

/// Convert boolean stress fields from old configs into stress levels.
///
/// Running it on an already migrated record changes nothing.
pub fn migrate(mut record: Map<String, Value>) -> Map<String, Value> {
    for key in ["cpu_stress", "gpu_stress"] {
        if let Some(Value::Bool(enabled)) = record.get(key) {
            let level = StressLevel::from_legacy(*enabled);
            record.insert(key.to_string(), Value::String(level.as_str().to_string()));
        }
    }
    record
}

/// Loads and saves the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, falling back to defaults when the file is missing or unreadable
    pub fn load(&self) -> Config {
        if !self.path.exists() {
            return Config::default();
        }

        match self.try_load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring unreadable config {:?}: {}", self.path, e);
                Config::default()
            }
        }
    }

    fn try_load(&self) -> Result<Config> {
        let data = fs::read_to_string(&self.path)?;

        match serde_json::from_str::<Value>(&data)? {
            Value::Object(record) => Config::from_record(record),
            _ => Err(CyclerError::config("config file is not a JSON object")),
        }
    }

    /// Write the whole config, replacing the previous file in one rename
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_string_pretty(config)?;

        let mut tmp_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| CyclerError::config(format!("invalid config path {:?}", self.path)))?;
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, &self.path)?;

        log::debug!("Saved config to {:?}", self.path);
        Ok(())
    }
}
