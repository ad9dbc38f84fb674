use super::config::OptimizationConfig;
use super::error::EngineError;
use super::objective::{Objective, pack, project, unpack_normalized};
use super::progress::{Progress, ProgressReporter};
use super::rules::UpdateRule;
use super::state::{IterationHistory, OptimizationResult};
use crate::core::hamiltonian::evaluator::Hamiltonian;
use nalgebra::{DVector, Vector3};
use tracing::{debug, info, instrument, trace};

/// Steps between two `debug!` energy reports.
const DEBUG_LOG_INTERVAL: usize = 50;

/// Minimizes the energy of `initial` under `hamiltonian`.
///
/// Each step normalizes the spins, evaluates the energy and its gradient,
/// applies the configured update rule to the raw parameters and projects
/// every spin back to unit length. The loop runs for exactly
/// `config.steps` steps and records one energy breakdown per step.
///
/// # Errors
///
/// Returns [`EngineError::InputValidation`] if `initial` does not match the
/// Hamiltonian and [`EngineError::NumericalDivergence`] if an energy, a
/// gradient or a spin norm stops being finite.
#[instrument(skip_all, name = "optimize_spins", fields(optimizer = %config.optimizer, steps = config.steps))]
pub fn optimize(
    hamiltonian: &Hamiltonian,
    initial: &[Vector3<f64>],
    config: &OptimizationConfig,
    reporter: &ProgressReporter,
) -> Result<OptimizationResult, EngineError> {
    if initial.len() != hamiltonian.n_sites() {
        return Err(EngineError::InputValidation(format!(
            "initial configuration has {} spin(s), the Hamiltonian expects {}",
            initial.len(),
            hamiltonian.n_sites()
        )));
    }

    let mut params = pack(initial);
    let mut grad = DVector::zeros(params.len());
    let mut objective = Objective::new(hamiltonian, config.external_field.as_ref());
    let mut rule = UpdateRule::from_config(config, params.len());
    let mut history = IterationHistory::with_capacity(config.steps);

    info!(
        sites = initial.len(),
        learning_rate = config.learning_rate,
        "Starting spin optimization."
    );
    reporter.report(Progress::TaskStart {
        total_steps: config.steps as u64,
    });

    for step in 0..config.steps {
        project(&mut params, step)?;
        let pre_step = rule.step(&mut params, &mut grad, &mut objective, step)?;
        project(&mut params, step)?;

        let energy = match pre_step {
            Some(energy) => energy,
            None => objective.energy(&params, step)?,
        };
        history.push(step, energy);

        trace!(step, total = energy.total(), "Step complete.");
        if step % DEBUG_LOG_INTERVAL == 0 || step + 1 == config.steps {
            debug!(
                step,
                total = energy.total(),
                heisenberg = energy.heisenberg,
                dmi = energy.dmi,
                anisotropy = energy.anisotropy,
                external = energy.external,
                "Energy breakdown."
            );
            reporter.report(Progress::Energy {
                step,
                total: energy.total(),
            });
        }
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);

    let spins = unpack_normalized(&params, config.steps)?;
    let evaluations = objective.evaluations();
    let final_energy = history.last().map(|r| r.energy.total());
    info!(
        final_energy = final_energy.unwrap_or(f64::NAN),
        evaluations,
        "Spin optimization complete."
    );

    Ok(OptimizationResult {
        spins,
        history,
        evaluations,
    })
}
