use crate::cli::SortArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::files::{read_star, write_star};
use relion_star::core::error::StarError;
use tracing::info;

pub fn run(args: SortArgs, config: &AppConfig) -> Result<()> {
    let mut star = read_star(&args.table.path, &config.parse)?;
    let table = star.table_mut(args.table.block.as_deref())?;

    info!(
        "Sorting {} rows by '{}' ({}).",
        table.len(),
        args.by,
        if args.descending { "descending" } else { "ascending" }
    );
    table
        .sort_by_column(&args.by, args.descending)
        .map_err(StarError::from)?;

    write_star(&args.output, &star, &config.write)?;
    println!("✓ Sorted table written to: {}", args.output.display());
    Ok(())
}
