use crate::cli::DefocusGroupsArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::files::{read_star, write_star};
use relion_star::workflows::defocus::assign_defocus_groups;
use tracing::info;

pub fn run(args: DefocusGroupsArgs, config: &AppConfig) -> Result<()> {
    let mut star = read_star(&args.table.path, &config.parse)?;
    let table = star.table_mut(args.table.block.as_deref())?;

    info!(
        "Grouping {} particles (max range {} A, at least {} per group)...",
        table.len(),
        config.defocus.max_range,
        config.defocus.min_particles
    );
    let groups = assign_defocus_groups(table, &config.defocus)?;

    write_star(&args.output, &star, &config.write)?;

    println!("{:>6} {:>9} {:>12} {:>12}", "Group", "Particles", "Min defocus", "Max defocus");
    for group in &groups {
        println!(
            "{:>6} {:>9} {:>12.1} {:>12.1}",
            group.number, group.count, group.min_defocus, group.max_defocus
        );
    }
    println!(
        "✓ {} defocus group(s) written to: {}",
        groups.len(),
        args.output.display()
    );
    Ok(())
}
