// UI and formatting module

pub mod formatters;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_choices, format_info, format_session_status, format_snapshot, format_title,
    format_toggle_label, render_report,
};
pub use prompts::{dimmed, error, heading, success, warn};
