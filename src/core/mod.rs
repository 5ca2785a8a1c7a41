// Core business logic module

pub mod config;
pub mod counters;
pub mod paths;
pub mod poller;
pub mod session;
pub mod stats;
pub mod status;
pub mod version;

// Re-export commonly used items
pub use config::{Config, ConfigStore, LimitKind, StressLevel};
pub use counters::SessionCounters;
pub use paths::AppPaths;
pub use poller::{RefreshTimer, StatusSnapshot, REFRESH_PERIOD};
pub use session::{CycleSessionController, OverrideRole, SessionState, StopOutcome};
pub use stats::{fmt_time, StatsAggregator, StatsReport};
pub use status::{BatterySnapshot, CapacityRegisters, PowerProfile, StatusProbe};
