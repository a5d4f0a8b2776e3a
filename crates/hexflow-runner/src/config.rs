//! Run configuration.
//!
//! Settings come from an optional TOML file; command-line flags override
//! whatever the file sets. Every field has a default so an empty file (or no
//! file) is valid apart from the save file itself.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// Default number of steps to run.
pub const DEFAULT_STEPS: u64 = 10;

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Save file to load.
    pub save_file: Option<PathBuf>,
    /// Number of steps to advance the factory.
    pub steps: u64,
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
    /// Print the grid every N steps. 0 prints only the initial and final grid.
    pub render_every: u64,
    /// Write the final snapshot as JSON to this path.
    pub json_snapshot: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            save_file: None,
            steps: DEFAULT_STEPS,
            log_filter: None,
            render_every: 0,
            json_snapshot: None,
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, RunnerError> {
        toml::from_str(text).map_err(|source| RunnerError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, RunnerError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, path)
    }

    /// Overlay the flags that were actually given.
    pub fn apply(&mut self, cli: &Cli) {
        if let Some(save) = &cli.save_file {
            self.save_file = Some(save.clone());
        }
        if let Some(steps) = cli.steps {
            self.steps = steps;
        }
        if let Some(filter) = &cli.log {
            self.log_filter = Some(filter.clone());
        }
        if let Some(every) = cli.render_every {
            self.render_every = every;
        }
        if let Some(json) = &cli.json {
            self.json_snapshot = Some(json.clone());
        }
    }

    /// Resolve the final configuration from the command line.
    pub fn resolve(cli: &Cli) -> Result<Self, RunnerError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(cli);
        Ok(config)
    }

    pub fn save_file(&self) -> Result<&Path, RunnerError> {
        self.save_file.as_deref().ok_or(RunnerError::MissingSaveFile)
    }

    /// Whether the grid should be printed after `step`.
    pub fn renders_at(&self, step: u64) -> bool {
        self.render_every > 0 && step % self.render_every == 0
    }
}

/// Headless hexflow runner: load a save file and step the factory.
#[derive(Parser, Debug, Default)]
#[command(name = "hexflow-runner")]
#[command(about = "Load a hexflow save file and advance it step by step")]
pub struct Cli {
    /// Save file to load (overrides `save_file` in the config)
    pub save_file: Option<PathBuf>,

    /// TOML config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of steps to run
    #[arg(long, short = 'n')]
    pub steps: Option<u64>,

    /// Print the grid every N steps
    #[arg(long)]
    pub render_every: Option<u64>,

    /// Write the final snapshot as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "hexflow_core=debug")
    #[arg(long)]
    pub log: Option<String>,
}
