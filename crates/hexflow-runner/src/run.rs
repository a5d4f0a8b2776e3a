//! The step loop.

use std::io::Write;

use hexflow_core::ChainFault;
use hexflow_spatial::Factory;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::RunnerError;

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub moved: usize,
    pub consumed: usize,
    /// Faults keyed by the step they happened in.
    pub faults: Vec<(u64, String)>,
}

impl RunSummary {
    fn record_fault(&mut self, step: u64, fault: &ChainFault) {
        self.faults.push((
            step,
            format!("chain {} -> {}: {}", fault.head, fault.tail, fault.error),
        ));
    }
}

/// Advance `factory` by `config.steps`, printing the grid to `out` before
/// the first step, on every scheduled step and after the last one.
pub fn run(
    factory: &mut Factory,
    config: &RunConfig,
    out: &mut impl Write,
) -> Result<RunSummary, RunnerError> {
    let mut summary = RunSummary::default();
    render(factory, out)?;

    for _ in 0..config.steps {
        let report = factory.step();
        summary.steps += 1;
        summary.moved += report.moved();
        summary.consumed += report.consumed();
        for fault in &report.faults {
            summary.record_fault(report.step, fault);
        }
        if config.renders_at(report.step) && report.step != config.steps {
            render(factory, out)?;
        }
    }

    if config.steps > 0 {
        render(factory, out)?;
    }

    if summary.faults.is_empty() {
        info!(
            steps = summary.steps,
            moved = summary.moved,
            consumed = summary.consumed,
            "run complete"
        );
    } else {
        warn!(
            steps = summary.steps,
            faults = summary.faults.len(),
            "run complete with faults"
        );
    }
    Ok(summary)
}

fn render(factory: &Factory, out: &mut impl Write) -> Result<(), RunnerError> {
    writeln!(out, "step {}", factory.steps_run())?;
    for row in factory.render_rows() {
        writeln!(out, "  {row}")?;
    }
    Ok(())
}

/// Write the factory snapshot as pretty JSON.
pub fn write_snapshot(factory: &Factory, out: &mut impl Write) -> Result<(), RunnerError> {
    serde_json::to_writer_pretty(&mut *out, &factory.snapshot())?;
    writeln!(out)?;
    Ok(())
}
