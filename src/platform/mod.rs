// Platform-specific code module

pub mod battery_cli;
pub mod process;

// Re-exports for cleaner imports
pub use battery_cli::BatteryCli;
pub use process::{CommandOutput, CommandRunner, SystemRunner, Termination};
