use super::spin_table;
use crate::core::hamiltonian::term::EnergyBreakdown;
use crate::core::models::spin::SpinSite;
use serde::Serialize;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const PARTIAL_SUFFIX: &str = "partial";

#[derive(Debug, Error)]
pub enum RunLogError {
    #[error("Invalid run identifier '{0}': must be non-empty and contain no path separators")]
    InvalidRunId(String),
    #[error("I/O error for '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Returns true if `run_id` can be embedded in a file name.
pub fn is_valid_run_id(run_id: &str) -> bool {
    !run_id.is_empty()
        && run_id != "."
        && run_id != ".."
        && !run_id.chars().any(|c| c == '/' || c == '\\' || c == '\0')
}

#[derive(Debug, Serialize)]
struct EnergyLogRow {
    step: usize,
    total: f64,
    heisenberg: f64,
    dmi: f64,
    anisotropy: f64,
}

/// Paths of the artifacts written for one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    pub energy_log: PathBuf,
    pub spins: PathBuf,
}

/// Writes the artifacts of a run, keyed by run identifier and update rule.
#[derive(Debug, Clone)]
pub struct RunLog {
    output_dir: PathBuf,
    run_id: String,
    rule: String,
}

impl RunLog {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        run_id: &str,
        rule: &str,
    ) -> Result<Self, RunLogError> {
        if !is_valid_run_id(run_id) {
            return Err(RunLogError::InvalidRunId(run_id.to_string()));
        }
        Ok(Self {
            output_dir: output_dir.into(),
            run_id: run_id.to_string(),
            rule: rule.to_string(),
        })
    }

    pub fn energy_log_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("energy_log_{}_{}.csv", self.run_id, self.rule))
    }

    pub fn spins_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("optimized_spins_{}_{}.csv", self.run_id, self.rule))
    }

    /// Persists the energy history and the final spin table.
    ///
    /// Both files are written next to their destination with a `.partial`
    /// extension and renamed into place once both are complete. On failure
    /// neither partial nor final-named files are left behind.
    pub fn write<'a>(
        &self,
        history: impl IntoIterator<Item = (usize, &'a EnergyBreakdown)>,
        spins: &[SpinSite],
    ) -> Result<RunArtifacts, RunLogError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| RunLogError::Io {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let artifacts = RunArtifacts {
            energy_log: self.energy_log_path(),
            spins: self.spins_path(),
        };
        let log_partial = artifacts.energy_log.with_extension(PARTIAL_SUFFIX);
        let spins_partial = artifacts.spins.with_extension(PARTIAL_SUFFIX);

        let staged = write_energy_log(&log_partial, history)
            .and_then(|rows| {
                spin_table::write_to(create(&spins_partial)?, spins).map_err(|e| {
                    RunLogError::Csv {
                        path: spins_partial.clone(),
                        source: e,
                    }
                })?;
                Ok(rows)
            })
            .and_then(|rows| {
                promote(&log_partial, &artifacts.energy_log)?;
                if let Err(e) = promote(&spins_partial, &artifacts.spins) {
                    discard(&artifacts.energy_log);
                    return Err(e);
                }
                Ok(rows)
            });

        match staged {
            Ok(rows) => {
                info!(
                    energy_log = %artifacts.energy_log.display(),
                    spins = %artifacts.spins.display(),
                    rows,
                    "Run artifacts written."
                );
                Ok(artifacts)
            }
            Err(e) => {
                discard(&log_partial);
                discard(&spins_partial);
                Err(e)
            }
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<fs::File>, RunLogError> {
    fs::File::create(path)
        .map(BufWriter::new)
        .map_err(|e| RunLogError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

fn promote(from: &Path, to: &Path) -> Result<(), RunLogError> {
    fs::rename(from, to).map_err(|e| RunLogError::Io {
        path: to.to_path_buf(),
        source: e,
    })
}

fn discard(path: &Path) {
    if fs::remove_file(path).is_ok() {
        debug!(path = %path.display(), "Removed incomplete artifact.");
    }
}

fn write_energy_log<'a>(
    path: &Path,
    history: impl IntoIterator<Item = (usize, &'a EnergyBreakdown)>,
) -> Result<usize, RunLogError> {
    let csv_err = |e| RunLogError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    let mut writer = csv::Writer::from_writer(create(path)?);
    let mut rows = 0;
    for (step, energy) in history {
        writer
            .serialize(EnergyLogRow {
                step,
                total: energy.total(),
                heisenberg: energy.heisenberg,
                dmi: energy.dmi,
                anisotropy: energy.anisotropy,
            })
            .map_err(csv_err)?;
        rows += 1;
    }
    writer.flush().map_err(|e| RunLogError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(rows)
}
