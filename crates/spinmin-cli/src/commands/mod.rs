pub mod benchmark;
pub mod compare;
pub mod optimize;

use crate::config::LatticeInput;
use crate::error::{CliError, Result};
use spinmin::core::io::discovery::SystemFiles;
use spinmin::core::models::system::SpinSystem;
use tracing::info;

/// Locates and parses the tables of the lattice described by `input`.
fn load_lattice(input: &LatticeInput) -> Result<SpinSystem> {
    info!("Discovering lattice tables in {:?}", input.dir);
    let files = SystemFiles::discover(&input.dir, &input.overrides)
        .map_err(|e| CliError::file(&input.dir, e))?;
    info!(
        "Using restart {:?}, exchange {:?}, DMI {:?}, anisotropy {:?}",
        files.restart, files.exchange, files.dmi, files.anisotropy
    );
    files.load().map_err(|e| CliError::file(&input.dir, e))
}
