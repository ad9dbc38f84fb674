use crate::core::io::run_log::{RunArtifacts, RunLog};
use crate::core::models::spin::SpinSite;
use crate::core::models::system::SpinSystem;
use crate::engine::config::OptimizationConfig;
use crate::engine::error::EngineError;
use crate::engine::optimizer;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::OptimizationResult;
use nalgebra::Vector3;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct OptimizeOutcome {
    pub result: OptimizationResult,
    /// Final spins with the site identifiers and atom labels of the input.
    pub spins: Vec<SpinSite>,
    /// Written artifacts, when an output directory was given.
    pub artifacts: Option<RunArtifacts>,
}

/// Minimizes `system` starting from its input spins.
///
/// When `output_dir` is given, the energy log and the final spin table are
/// written there after the run succeeds. A failed run writes nothing.
pub fn run(
    system: &SpinSystem,
    config: &OptimizationConfig,
    output_dir: Option<&Path>,
    reporter: &ProgressReporter,
) -> Result<OptimizeOutcome, EngineError> {
    run_from(system, &system.unit_spins(), config, output_dir, reporter)
}

/// Like [`run`], but starting from `initial` instead of the input spins.
#[instrument(skip_all, name = "optimize_workflow", fields(run_id = %config.run_id, optimizer = %config.optimizer))]
pub fn run_from(
    system: &SpinSystem,
    initial: &[Vector3<f64>],
    config: &OptimizationConfig,
    output_dir: Option<&Path>,
    reporter: &ProgressReporter,
) -> Result<OptimizeOutcome, EngineError> {
    // Validate the file names before spending any iterations.
    let run_log = output_dir
        .map(|dir| RunLog::new(dir, &config.run_id, config.optimizer.name()))
        .transpose()?;

    reporter.report(Progress::PhaseStart { name: "Optimization" });
    let result = optimizer::optimize(system.hamiltonian(), initial, config, reporter)?;
    reporter.report(Progress::PhaseFinish);

    let spins = system.with_moments(&result.spins);

    let artifacts = match run_log {
        Some(log) => Some(log.write(result.history.entries(), &spins)?),
        None => None,
    };

    info!(
        final_energy = result.final_energy().unwrap_or(f64::NAN),
        "Optimization workflow complete."
    );

    Ok(OptimizeOutcome {
        result,
        spins,
        artifacts,
    })
}
