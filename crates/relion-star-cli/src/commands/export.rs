use crate::cli::ExportArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use relion_star::core::io::delimited::write_delimited;
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

pub fn run(args: ExportArgs, config: &AppConfig) -> Result<()> {
    let table = args
        .table
        .read(&config.parse)
        .map_err(|e| CliError::FileParsing {
            path: args.table.path.clone(),
            source: e.into(),
        })?;

    let (delimiter, format) = if args.tsv { (b'\t', "TSV") } else { (b',', "CSV") };
    info!(
        "Exporting {} rows x {} columns as {} to {:?}",
        table.len(),
        table.num_columns(),
        format,
        args.output
    );
    let writer = BufWriter::new(File::create(&args.output)?);
    write_delimited(&table, writer, delimiter, config.write.float_precision)?;

    println!("✓ {} written to: {}", format, args.output.display());
    Ok(())
}
