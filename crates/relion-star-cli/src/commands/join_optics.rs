use crate::cli::JoinOpticsArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::files::{read_star, write_star};
use relion_star::workflows::optics::join_optics;

pub fn run(args: JoinOpticsArgs, config: &AppConfig) -> Result<()> {
    let mut star = read_star(&args.input, &config.parse)?;
    let labels: Vec<&str> = args.labels.iter().map(String::as_str).collect();

    let joined = join_optics(&star, &args.block, &labels)?;
    let columns = joined.num_columns();
    *star.table_mut(Some(args.block.as_str()))? = joined;

    write_star(&args.output, &star, &config.write)?;
    println!(
        "✓ Block '{}' now has {} column(s); written to: {}",
        args.block,
        columns,
        args.output.display()
    );
    Ok(())
}
