use spinmin::core::io::discovery::FileOverrides;
use spinmin::engine::config::OptimizationConfig;
use spinmin::workflows::benchmark::BenchmarkConfig;
use std::path::PathBuf;

/// Where the lattice tables come from.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeInput {
    pub dir: PathBuf,
    pub overrides: FileOverrides,
}

pub struct OptimizeAppConfig {
    pub lattice: LatticeInput,
    pub output_dir: PathBuf,
    pub reference: Option<PathBuf>,
    pub core_config: OptimizationConfig,
}

pub struct BenchmarkAppConfig {
    pub lattice: LatticeInput,
    pub output_dir: PathBuf,
    pub core_config: BenchmarkConfig,
}
