use crate::utils::parser::parse_vector;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The spinmin developers",
    version,
    about = "spinmin - Energy minimization of classical spin lattices under a generalized Heisenberg Hamiltonian.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used by benchmark runs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Minimize the energy of a spin lattice with one update rule.
    Optimize(OptimizeArgs),
    /// Report the per-site angular deviation between two spin tables.
    Compare(CompareArgs),
    /// Run several update rules over repeated trials and summarize the results.
    Benchmark(BenchmarkArgs),
}

/// Location of the lattice input tables.
#[derive(Args, Debug, Clone, Default)]
pub struct LatticeArgs {
    /// Directory holding the UppASD tables (restart file, jij, dmdata, anisotropy).
    #[arg(short = 'i', long = "lattice", value_name = "DIR")]
    pub lattice_dir: Option<PathBuf>,

    /// Use this restart file instead of the one found in the lattice directory.
    #[arg(long, value_name = "PATH")]
    pub restart: Option<PathBuf>,

    /// Use this exchange table instead of `jij`.
    #[arg(long, value_name = "PATH")]
    pub exchange: Option<PathBuf>,

    /// Use this DMI table instead of `dmdata`.
    #[arg(long, value_name = "PATH")]
    pub dmi: Option<PathBuf>,

    /// Use this anisotropy table instead of the first `anisotropy*` file.
    #[arg(long, value_name = "PATH")]
    pub anisotropy: Option<PathBuf>,
}

/// Run parameters shared by `optimize` and `benchmark`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Override the learning rate.
    #[arg(short = 'r', long = "lr", value_name = "FLOAT")]
    pub learning_rate: Option<f64>,

    /// Override the number of optimization steps.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Identifier used in the names of the written artifacts.
    #[arg(long, value_name = "ID")]
    pub run_id: Option<String>,

    /// Uniform external field applied to every spin.
    #[arg(long, value_name = "BX,BY,BZ", value_parser = parse_vector, allow_hyphen_values = true)]
    pub field: Option<[f64; 3]>,

    /// Inner iterations of one L-BFGS step.
    #[arg(long, value_name = "INT")]
    pub lbfgs_max_iterations: Option<usize>,

    /// Decoupled weight decay of AdamW.
    #[arg(long, value_name = "FLOAT")]
    pub weight_decay: Option<f64>,
}

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub lattice: LatticeArgs,

    /// Directory receiving the energy log and the optimized spin table.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Update rule: sgd, adam, adamw, rmsprop, adagrad or lbfgs.
    #[arg(short = 'O', long, value_name = "NAME")]
    pub optimizer: Option<String>,

    #[command(flatten)]
    pub run: RunArgs,

    /// Spin table (site,atom,mx,my,mz) the result is compared against.
    /// Defaults to the input spins.
    #[arg(long, value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S optimization.steps=2000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Reference spin table (site,atom,mx,my,mz).
    #[arg(required = true, value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// Spin table compared against the reference.
    #[arg(required = true, value_name = "CANDIDATE")]
    pub candidate: PathBuf,

    /// Also print the deviation of every site.
    #[arg(long)]
    pub per_site: bool,
}

/// Arguments for the `benchmark` subcommand.
#[derive(Args, Debug)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub lattice: LatticeArgs,

    /// Directory receiving the per-run artifacts and the summary table.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Comma-separated update rules to compare.
    #[arg(short = 'O', long, value_name = "NAMES", value_delimiter = ',')]
    pub optimizers: Vec<String>,

    #[command(flatten)]
    pub run: RunArgs,

    /// Number of trials per update rule.
    #[arg(short, long, value_name = "INT")]
    pub trials: Option<usize>,

    /// Half-width of the uniform jitter added to the initial spins of each trial.
    #[arg(long, value_name = "FLOAT")]
    pub perturbation: Option<f64>,

    /// Seed of the first trial's jitter.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S benchmark.trials=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
