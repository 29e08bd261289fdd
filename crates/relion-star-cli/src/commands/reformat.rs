use crate::cli::ReformatArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::files::{read_star, write_star};

pub fn run(args: ReformatArgs, config: &AppConfig) -> Result<()> {
    let star = read_star(&args.input, &config.parse)?;
    write_star(&args.output, &star, &config.write)?;
    println!(
        "✓ Rewrote {} block(s) to: {}",
        star.len(),
        args.output.display()
    );
    Ok(())
}
