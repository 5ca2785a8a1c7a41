use std::io;
use thiserror::Error;

/// Custom error type for the cycler library
#[derive(Error, Debug)]
pub enum CyclerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process control error: {0}")]
    Process(String),

}

/// Result type alias for the cycler library
pub type Result<T> = std::result::Result<T, CyclerError>;

impl CyclerError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        CyclerError::Config(msg.into())
    }

    /// Create a process control error
    pub fn process<S: Into<String>>(msg: S) -> Self {
        CyclerError::Process(msg.into())
    }
}
