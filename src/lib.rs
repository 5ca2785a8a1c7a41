// Cycler Library - Public API

// Re-export error types
pub mod error;
pub use error::{CyclerError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::{Config, ConfigStore, StressLevel};
pub use crate::core::paths::AppPaths;
pub use crate::core::session::{CycleSessionController, OverrideRole, SessionState};

// Initialize logging
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    // RUST_LOG still overrides the default level
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
