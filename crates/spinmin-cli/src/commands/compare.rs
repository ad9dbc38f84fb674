use crate::cli::CompareArgs;
use crate::error::{CliError, Result};
use spinmin::core::analysis::compare::compare_spins;
use spinmin::core::io::spin_table;
use spinmin::engine::error::EngineError;
use std::path::Path;
use tracing::info;

pub fn run(args: CompareArgs) -> Result<()> {
    let reference = read_table(&args.reference)?;
    let candidate = read_table(&args.candidate)?;

    let deviation = compare_spins(&reference, &candidate).map_err(EngineError::from)?;

    if args.per_site {
        println!("site,deviation_deg");
        for (site, angle) in &deviation.per_site {
            println!("{site},{angle:.6}");
        }
    }
    println!(
        "Mean per-site angular deviation: {:.4}°",
        deviation.mean_deg
    );
    println!("Max per-site angular deviation: {:.4}°", deviation.max_deg);
    Ok(())
}

fn read_table(path: &Path) -> Result<Vec<spinmin::core::models::spin::SpinSite>> {
    info!("Loading spin table from {:?}", path);
    spin_table::read_from_path(path).map_err(|e| CliError::file(path, e))
}
