use thiserror::Error;

use super::config::ConfigError;
use crate::core::analysis::compare::CompareError;
use crate::core::hamiltonian::evaluator::HamiltonianError;
use crate::core::io::run_log::RunLogError;
use crate::core::models::system::SystemError;

/// The quantity found to be non-finite or degenerate during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergentQuantity {
    Energy,
    Gradient,
    SpinNorm,
}

impl std::fmt::Display for DivergentQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Energy => "energy",
            Self::Gradient => "gradient",
            Self::SpinNorm => "spin norm",
        })
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Invalid configuration: {source}")]
    Configuration {
        #[from]
        source: ConfigError,
    },

    #[error("Numerical divergence at step {step}: non-finite or degenerate {quantity}")]
    NumericalDivergence {
        step: usize,
        quantity: DivergentQuantity,
    },

    #[error("Failed to write run artifacts: {source}")]
    RunLog {
        #[from]
        source: RunLogError,
    },

    #[error("Benchmark run '{run_id}' with {optimizer} failed: {source}")]
    BenchmarkRun {
        run_id: String,
        optimizer: &'static str,
        source: Box<EngineError>,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<HamiltonianError> for EngineError {
    fn from(e: HamiltonianError) -> Self {
        Self::InputValidation(e.to_string())
    }
}

impl From<SystemError> for EngineError {
    fn from(e: SystemError) -> Self {
        Self::InputValidation(e.to_string())
    }
}

impl From<CompareError> for EngineError {
    fn from(e: CompareError) -> Self {
        Self::InputValidation(e.to_string())
    }
}
