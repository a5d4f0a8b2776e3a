//! Headless driver for a hexflow factory.
//!
//! Loads a save file, advances the factory a fixed number of steps and prints
//! the grid as it goes. Settings come from an optional TOML file overlaid
//! with command-line flags; see [`config::RunConfig`].
//!
//! ```text
//! hexflow-runner factory.txt --steps 20 --render-every 5 --json final.json
//! ```

mod config;
mod error;
mod run;

use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, RunConfig};
use crate::error::RunnerError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match RunConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hexflow-runner: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    match execute(&config) {
        Ok(summary) if summary.faults.is_empty() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins, then the configured filter, then `info`.
fn init_logging(config: &RunConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| match &config.log_filter {
            Some(directive) => EnvFilter::try_new(directive),
            None => Ok(EnvFilter::new("info")),
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn execute(config: &RunConfig) -> Result<run::RunSummary, RunnerError> {
    let path = config.save_file()?;
    info!(save_file = %path.display(), steps = config.steps, "hexflow-runner starting");

    let mut factory = hexflow_data::load_path(path).map_err(|source| RunnerError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let stdout = io::stdout();
    let summary = run::run(&mut factory, config, &mut stdout.lock())?;

    if let Some(json_path) = &config.json_snapshot {
        let mut out = BufWriter::new(File::create(json_path)?);
        run::write_snapshot(&factory, &mut out)?;
        info!(path = %json_path.display(), "snapshot written");
    }

    Ok(summary)
}
