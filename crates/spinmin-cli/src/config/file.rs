use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileInputConfig {
    pub lattice_dir: Option<PathBuf>,
    pub restart: Option<PathBuf>,
    pub exchange: Option<PathBuf>,
    pub dmi: Option<PathBuf>,
    pub anisotropy: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOutputConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOptimizationConfig {
    pub optimizer: Option<String>,
    pub learning_rate: Option<f64>,
    pub steps: Option<usize>,
    pub run_id: Option<String>,
    pub external_field: Option<[f64; 3]>,
    pub lbfgs_max_iterations: Option<usize>,
    pub weight_decay: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBenchmarkConfig {
    pub optimizers: Option<Vec<String>>,
    pub trials: Option<usize>,
    pub perturbation: Option<f64>,
    pub seed: Option<u64>,
}

/// The optional TOML configuration file. Every key is optional; missing keys
/// fall back to command-line flags or built-in defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<FileInputConfig>,
    pub output: Option<FileOutputConfig>,
    pub optimization: Option<FileOptimizationConfig>,
    pub benchmark: Option<FileBenchmarkConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
