use super::load_lattice;
use crate::cli::OptimizeArgs;
use crate::config::build_optimize_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use spinmin::core::analysis::compare::compare_spins;
use spinmin::core::io::spin_table;
use spinmin::engine::error::EngineError;
use spinmin::engine::progress::ProgressReporter;
use spinmin::workflows;
use tracing::info;

pub fn run(args: OptimizeArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_optimize_config(&args)?;
    let config = &app.core_config;

    let system = load_lattice(&app.lattice)?;
    std::fs::create_dir_all(&app.output_dir)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Optimizing {} spins with {} ({} steps, lr = {})...",
        system.len(),
        config.optimizer,
        config.steps,
        config.learning_rate
    );
    info!("Invoking the core optimization workflow...");
    let outcome = workflows::optimize::run(&system, config, Some(&app.output_dir), &reporter)?;

    if let Some(last) = outcome.result.history.last() {
        let e = &last.energy;
        println!(
            "Final energy: {:.6} (heisenberg {:.6}, dmi {:.6}, anisotropy {:.6}, external {:.6})",
            e.total(),
            e.heisenberg,
            e.dmi,
            e.anisotropy,
            e.external
        );
    }
    if let Some(artifacts) = &outcome.artifacts {
        println!("✓ Energy log written to: {}", artifacts.energy_log.display());
        println!("✓ Optimized spins written to: {}", artifacts.spins.display());
    }

    let reference = match &app.reference {
        Some(path) => {
            info!("Loading reference spins from {:?}", path);
            spin_table::read_from_path(path).map_err(|e| CliError::file(path, e))?
        }
        None => system.sites().to_vec(),
    };
    let deviation = compare_spins(&reference, &outcome.spins).map_err(EngineError::from)?;
    println!(
        "Mean per-site angular deviation: {:.4}°",
        deviation.mean_deg
    );
    println!("Max per-site angular deviation: {:.4}°", deviation.max_deg);

    Ok(())
}
