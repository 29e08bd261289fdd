use crate::cli::FilterArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::files::{read_star, write_star};
use crate::utils::predicate::Predicate;
use tracing::info;

pub fn run(args: FilterArgs, config: &AppConfig) -> Result<()> {
    let predicates = args
        .conditions
        .iter()
        .map(|condition| condition.parse::<Predicate>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CliError::Argument(e.to_string()))?;

    let mut star = read_star(&args.table.path, &config.parse)?;
    let table = star.table_mut(args.table.block.as_deref())?;
    for predicate in &predicates {
        predicate
            .validate(table)
            .map_err(|e| CliError::Argument(e.to_string()))?;
        info!("Applying condition: {}", predicate);
    }

    let total = table.len();
    let filtered = table.filter_rows(|row| predicates.iter().all(|p| p.matches(row)));
    let kept = filtered.len();
    *table = filtered;
    info!("Kept {} of {} rows.", kept, total);

    write_star(&args.output, &star, &config.write)?;
    println!(
        "✓ Kept {} of {} rows; written to: {}",
        kept,
        total,
        args.output.display()
    );
    Ok(())
}
