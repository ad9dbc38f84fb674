use super::load_lattice;
use crate::cli::BenchmarkArgs;
use crate::config::build_benchmark_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use spinmin::engine::progress::ProgressReporter;
use spinmin::workflows;
use tracing::info;

pub fn run(args: BenchmarkArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_benchmark_config(&args)?;
    let config = &app.core_config;

    let system = load_lattice(&app.lattice)?;
    std::fs::create_dir_all(&app.output_dir)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Benchmarking {} update rule(s) over {} trial(s) on {} spins...",
        config.optimizers.len(),
        config.trials,
        system.len()
    );
    let summary = workflows::benchmark::run(&system, config, &app.output_dir, &reporter)?;

    println!(
        "{:<10} {:>4} {:>16} {:>12} {:>12} {:>10}",
        "optimizer", "run", "final_energy", "mean_diff", "max_diff", "time_s"
    );
    for r in &summary.records {
        println!(
            "{:<10} {:>4} {:>16.6} {:>12.4} {:>12.4} {:>10.3}",
            r.optimizer, r.run, r.final_energy, r.mean_site_diff, r.max_site_diff, r.elapsed_seconds
        );
    }
    println!(
        "✓ Benchmark summary written to: {}",
        summary.summary_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{LatticeArgs, RunArgs};
    use crate::commands::fixtures::write_chain_lattice;
    use crate::error::CliError;
    use tempfile::tempdir;

    fn args(lattice: &std::path::Path, output: &std::path::Path) -> BenchmarkArgs {
        BenchmarkArgs {
            lattice: LatticeArgs {
                lattice_dir: Some(lattice.to_path_buf()),
                ..Default::default()
            },
            output_dir: Some(output.to_path_buf()),
            config: None,
            optimizers: vec!["adam".to_string(), "lbfgs".to_string()],
            run: RunArgs {
                learning_rate: Some(0.05),
                steps: Some(5),
                run_id: Some("bench".to_string()),
                ..Default::default()
            },
            trials: Some(2),
            perturbation: Some(0.1),
            seed: Some(3),
            set_values: vec![],
        }
    }

    #[test]
    fn benchmark_writes_summary_and_every_run() {
        let lattice = tempdir().unwrap();
        write_chain_lattice(lattice.path());
        let out = tempdir().unwrap();

        run(args(lattice.path(), out.path())).unwrap();

        let summary =
            std::fs::read_to_string(out.path().join("benchmark_summary_bench.csv")).unwrap();
        assert_eq!(summary.lines().count(), 5);
        for trial in 0..2 {
            for rule in ["adam", "lbfgs"] {
                let name = format!("optimized_spins_bench_run{trial}_{rule}.csv");
                assert!(out.path().join(name).is_file());
            }
        }
    }

    #[test]
    fn invalid_configuration_stops_before_loading() {
        let out = tempdir().unwrap();
        let mut a = args(std::path::Path::new("/nonexistent"), out.path());
        a.trials = Some(0);
        assert!(matches!(run(a), Err(CliError::Config(_))));
    }
}
