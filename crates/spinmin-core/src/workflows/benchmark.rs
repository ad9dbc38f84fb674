use super::optimize;
use crate::core::analysis::compare::compare_spins;
use crate::core::io::run_log::RunLogError;
use crate::core::models::system::SpinSystem;
use crate::engine::config::{ConfigError, OptimizationConfig, OptimizerKind};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Shared run parameters. `optimizer` is replaced per run and `run_id`
    /// is the base identifier of every trial.
    pub base: OptimizationConfig,
    pub optimizers: Vec<OptimizerKind>,
    pub trials: usize,
    /// Half-width of the uniform jitter added to each moment component of the
    /// initial spins. Zero runs every trial from the input configuration.
    pub perturbation: f64,
    /// Seed of trial 0; trial `t` uses `seed + t`.
    pub seed: u64,
}

impl BenchmarkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.optimizers.is_empty() {
            return Err(ConfigError::MissingParameter("optimizers"));
        }
        if let Some(kind) = self.optimizers.iter().duplicates().next() {
            // Runs of the same rule and trial would share artifact names.
            return Err(ConfigError::InvalidParameter {
                name: "optimizers",
                reason: format!("'{kind}' is listed more than once"),
            });
        }
        if self.trials == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "trials",
                reason: "must be at least 1".into(),
            });
        }
        if !(self.perturbation.is_finite() && self.perturbation >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "perturbation",
                reason: "must be a non-negative finite number".into(),
            });
        }
        Ok(())
    }
}

/// One line of the benchmark summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRecord {
    pub optimizer: &'static str,
    pub run: usize,
    pub final_energy: f64,
    pub mean_site_diff: f64,
    pub max_site_diff: f64,
    pub elapsed_seconds: f64,
}

#[derive(Debug, Clone)]
pub struct BenchmarkSummary {
    /// Records ordered by trial, then by the configured rule order.
    pub records: Vec<BenchmarkRecord>,
    pub summary_path: PathBuf,
}

/// Identifier of trial `trial` of a benchmark based on `run_id`.
pub fn trial_run_id(run_id: &str, trial: usize) -> String {
    format!("{run_id}_run{trial}")
}

/// Adds seeded uniform jitter to every moment component and renormalizes.
pub fn perturb(spins: &[Vector3<f64>], amplitude: f64, seed: u64) -> Vec<Vector3<f64>> {
    if amplitude == 0.0 {
        return spins.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    spins
        .iter()
        .map(|s| {
            let jitter = Vector3::from_fn(|_, _| rng.gen_range(-amplitude..=amplitude));
            (s + jitter).try_normalize(f64::MIN_POSITIVE).unwrap_or(*s)
        })
        .collect()
}

/// Runs every configured rule `trials` times and writes
/// `benchmark_summary_{run_id}.csv` into `output_dir`.
///
/// Each run writes its own artifacts under `{run_id}_run{t}` and is compared
/// against the unperturbed input spins. Runs share no mutable state and
/// execute on the rayon pool when the `parallel` feature is enabled. The
/// first failing run aborts the benchmark and no summary is written.
#[instrument(skip_all, name = "benchmark_workflow", fields(run_id = %config.base.run_id))]
pub fn run(
    system: &SpinSystem,
    config: &BenchmarkConfig,
    output_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<BenchmarkSummary, EngineError> {
    config.validate()?;
    let initial = system.unit_spins();

    let jobs: Vec<(usize, usize, OptimizerKind)> = (0..config.trials)
        .cartesian_product(config.optimizers.iter().copied().enumerate())
        .map(|(trial, (order, kind))| (trial, order, kind))
        .collect();

    info!(
        runs = jobs.len(),
        trials = config.trials,
        optimizers = %config.optimizers.iter().join(","),
        "Starting benchmark."
    );
    reporter.report(Progress::PhaseStart { name: "Benchmark" });
    reporter.report(Progress::TaskStart {
        total_steps: jobs.len() as u64,
    });

    let iterator = jobs.iter();

    #[cfg(feature = "parallel")]
    let iterator = jobs.par_iter();

    let mut indexed: Vec<((usize, usize), BenchmarkRecord)> = iterator
        .map(|&(trial, order, kind)| -> Result<_, EngineError> {
            let record = run_single(system, &initial, config, output_dir, trial, kind)?;
            reporter.report(Progress::Message(format!(
                "{kind} run {trial}: E = {:.6}",
                record.final_energy
            )));
            reporter.report(Progress::TaskIncrement);
            Ok(((trial, order), record))
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    indexed.sort_by_key(|&(key, _)| key);
    let records: Vec<BenchmarkRecord> = indexed.into_iter().map(|(_, r)| r).collect();

    let summary_path = output_dir.join(format!("benchmark_summary_{}.csv", config.base.run_id));
    write_summary(&summary_path, &records)?;
    info!(path = %summary_path.display(), "Benchmark summary written.");

    Ok(BenchmarkSummary {
        records,
        summary_path,
    })
}

fn run_single(
    system: &SpinSystem,
    initial: &[Vector3<f64>],
    config: &BenchmarkConfig,
    output_dir: &Path,
    trial: usize,
    kind: OptimizerKind,
) -> Result<BenchmarkRecord, EngineError> {
    let run_id = trial_run_id(&config.base.run_id, trial);
    let run_config = OptimizationConfig {
        optimizer: kind,
        run_id: run_id.clone(),
        ..config.base.clone()
    };
    let start = perturb(
        initial,
        config.perturbation,
        config.seed.wrapping_add(trial as u64),
    );

    let timer = Instant::now();
    let outcome = optimize::run_from(
        system,
        &start,
        &run_config,
        Some(output_dir),
        &ProgressReporter::new(),
    )
    .and_then(|outcome| {
        let deviation = compare_spins(system.sites(), &outcome.spins)?;
        Ok((outcome, deviation))
    });
    let elapsed_seconds = timer.elapsed().as_secs_f64();

    let (outcome, deviation) = outcome.map_err(|e| EngineError::BenchmarkRun {
        run_id: run_id.clone(),
        optimizer: kind.name(),
        source: Box::new(e),
    })?;

    info!(
        run_id = %run_id,
        optimizer = %kind,
        elapsed_seconds,
        "Benchmark run finished."
    );

    Ok(BenchmarkRecord {
        optimizer: kind.name(),
        run: trial,
        final_energy: outcome.result.final_energy().unwrap_or(f64::NAN),
        mean_site_diff: deviation.mean_deg,
        max_site_diff: deviation.max_deg,
        elapsed_seconds,
    })
}

fn write_summary(path: &Path, records: &[BenchmarkRecord]) -> Result<(), RunLogError> {
    let partial = path.with_extension("partial");
    let csv_err = |source| RunLogError::Csv {
        path: partial.clone(),
        source,
    };
    let mut writer = csv::Writer::from_path(&partial).map_err(csv_err)?;
    for record in records {
        writer.serialize(record).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| RunLogError::Io {
        path: partial.clone(),
        source: e,
    })?;
    drop(writer);
    fs::rename(&partial, path).map_err(|e| RunLogError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
