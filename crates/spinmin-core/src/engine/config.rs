use crate::core::io::run_log::is_valid_run_id;
use nalgebra::Vector3;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Unknown optimizer '{0}' (expected one of: sgd, adam, adamw, rmsprop, adagrad, lbfgs)")]
    UnknownOptimizer(String),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// The gradient-based update rules available to the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerKind {
    Sgd,
    Adam,
    AdamW,
    RmsProp,
    Adagrad,
    Lbfgs,
}

static OPTIMIZER_NAMES: Map<&'static str, OptimizerKind> = phf_map! {
    "sgd" => OptimizerKind::Sgd, "gd" => OptimizerKind::Sgd,
    "adam" => OptimizerKind::Adam,
    "adamw" => OptimizerKind::AdamW,
    "rmsprop" => OptimizerKind::RmsProp,
    "adagrad" => OptimizerKind::Adagrad,
    "lbfgs" => OptimizerKind::Lbfgs, "l-bfgs" => OptimizerKind::Lbfgs,
};

impl OptimizerKind {
    pub const ALL: [OptimizerKind; 6] = [
        Self::Sgd,
        Self::Adam,
        Self::AdamW,
        Self::RmsProp,
        Self::Adagrad,
        Self::Lbfgs,
    ];

    /// Canonical lowercase name, used in artifact file names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sgd => "sgd",
            Self::Adam => "adam",
            Self::AdamW => "adamw",
            Self::RmsProp => "rmsprop",
            Self::Adagrad => "adagrad",
            Self::Lbfgs => "lbfgs",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptimizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPTIMIZER_NAMES
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownOptimizer(s.to_string()))
    }
}

pub const DEFAULT_LBFGS_MAX_ITERATIONS: usize = 20;
pub const DEFAULT_WEIGHT_DECAY: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationConfig {
    pub optimizer: OptimizerKind,
    pub learning_rate: f64,
    pub steps: usize,
    pub run_id: String,
    pub external_field: Option<Vector3<f64>>,
    /// Inner iterations of one L-BFGS step.
    pub lbfgs_max_iterations: usize,
    /// Decoupled weight decay of AdamW.
    pub weight_decay: f64,
}

#[derive(Default)]
pub struct OptimizationConfigBuilder {
    optimizer: Option<String>,
    learning_rate: Option<f64>,
    steps: Option<usize>,
    run_id: Option<String>,
    external_field: Option<Vector3<f64>>,
    lbfgs_max_iterations: Option<usize>,
    weight_decay: Option<f64>,
}

impl OptimizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optimizer(mut self, kind: OptimizerKind) -> Self {
        self.optimizer = Some(kind.name().to_string());
        self
    }
    /// Selects the update rule by name; resolved when the config is built.
    pub fn optimizer_name(mut self, name: impl Into<String>) -> Self {
        self.optimizer = Some(name.into());
        self
    }
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = Some(lr);
        self
    }
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }
    pub fn run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
    pub fn external_field(mut self, field: Option<Vector3<f64>>) -> Self {
        self.external_field = field;
        self
    }
    pub fn lbfgs_max_iterations(mut self, n: usize) -> Self {
        self.lbfgs_max_iterations = Some(n);
        self
    }
    pub fn weight_decay(mut self, wd: f64) -> Self {
        self.weight_decay = Some(wd);
        self
    }

    pub fn build(self) -> Result<OptimizationConfig, ConfigError> {
        let optimizer: OptimizerKind = self
            .optimizer
            .ok_or(ConfigError::MissingParameter("optimizer"))?
            .parse()?;

        let learning_rate = self
            .learning_rate
            .ok_or(ConfigError::MissingParameter("learning_rate"))?;
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(invalid("learning_rate", "must be a positive finite number"));
        }

        let steps = self.steps.ok_or(ConfigError::MissingParameter("steps"))?;
        if steps == 0 {
            return Err(invalid("steps", "must be at least 1"));
        }

        let run_id = self.run_id.ok_or(ConfigError::MissingParameter("run_id"))?;
        if !is_valid_run_id(&run_id) {
            return Err(invalid(
                "run_id",
                "must be non-empty and contain no path separators",
            ));
        }

        if let Some(b) = &self.external_field {
            if !b.iter().all(|c| c.is_finite()) {
                return Err(invalid("external_field", "components must be finite"));
            }
        }

        let lbfgs_max_iterations = self
            .lbfgs_max_iterations
            .unwrap_or(DEFAULT_LBFGS_MAX_ITERATIONS);
        if lbfgs_max_iterations == 0 {
            return Err(invalid("lbfgs_max_iterations", "must be at least 1"));
        }

        let weight_decay = self.weight_decay.unwrap_or(DEFAULT_WEIGHT_DECAY);
        if !(weight_decay.is_finite() && weight_decay >= 0.0) {
            return Err(invalid("weight_decay", "must be a non-negative finite number"));
        }

        Ok(OptimizationConfig {
            optimizer,
            learning_rate,
            steps,
            run_id,
            external_field: self.external_field,
            lbfgs_max_iterations,
            weight_decay,
        })
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}
