// Command handlers module
pub mod completions;
pub mod config;
pub mod hold;
pub mod logs;
pub mod run;
pub mod stats;
pub mod status;
pub mod version;

use anyhow::{Context as _, Result};
use std::sync::Arc;

use crate::core::{AppPaths, StatusProbe};
use crate::platform::{CommandRunner, SystemRunner};

/// Shared setup for every handler: resolved paths plus the command runner
pub struct Context {
    pub paths: AppPaths,
    pub runner: Arc<dyn CommandRunner>,
}

impl Context {
    pub fn discover() -> Result<Self> {
        let paths = AppPaths::discover()?;
        let runner = SystemRunner::new().context("Failed to start command runtime")?;
        Ok(Self {
            paths,
            runner: Arc::new(runner),
        })
    }

    pub fn probe(&self) -> StatusProbe {
        StatusProbe::new(self.runner.clone(), self.paths.clone())
    }
}
