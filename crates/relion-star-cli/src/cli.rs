use clap::{Args, Parser, Subcommand};
use relion_star::core::io::locator::TableLocator;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "J.M. de la Rosa Trevin, Grigory Sharov",
    version,
    about = "rstar - Inspect, filter, and rewrite Relion STAR metadata files.",
    after_help = "Tables are addressed as [BLOCK@]PATH, e.g. 'particles@Refine3D/job019/run_data.star'.",
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

    /// Set the number of threads used when processing several files.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S writer.float-precision=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,

    /// Read label types from a TOML file with a `[labels]` table.
    #[arg(long, global = true, value_name = "PATH")]
    pub type_hints: Option<PathBuf>,

    /// Infer every column type from its values instead of using the
    /// built-in Relion label types.
    #[arg(long, global = true)]
    pub no_relion_types: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the blocks, columns and row counts of STAR files.
    Info(InfoArgs),
    /// Print the rows of a table.
    Show(ShowArgs),
    /// Keep only the rows of a table that satisfy every condition.
    Filter(FilterArgs),
    /// Sort the rows of a table by one column.
    Sort(SortArgs),
    /// Rewrite a STAR file with the configured writer settings.
    Reformat(ReformatArgs),
    /// Export a table as CSV or TSV.
    Export(ExportArgs),
    /// Assign particles to defocus groups (rlnGroupNumber).
    DefocusGroups(DefocusGroupsArgs),
    /// Copy optics-group columns into the rows of a data block.
    JoinOptics(JoinOpticsArgs),
}

impl Commands {
    /// Writer overrides of commands that write a STAR file.
    pub fn writer_args(&self) -> Option<&WriterArgs> {
        match self {
            Commands::Filter(args) => Some(&args.writer),
            Commands::Sort(args) => Some(&args.writer),
            Commands::Reformat(args) => Some(&args.writer),
            Commands::DefocusGroups(args) => Some(&args.writer),
            Commands::JoinOptics(args) => Some(&args.writer),
            Commands::Info(_) | Commands::Show(_) | Commands::Export(_) => None,
        }
    }
}

/// Overrides for the STAR writer settings.
#[derive(Args, Debug, Default, Clone)]
pub struct WriterArgs {
    /// Number of decimals written for float values.
    #[arg(long, value_name = "INT")]
    pub precision: Option<usize>,

    /// Omit the `#N` column index after each label.
    #[arg(long)]
    pub no_column_numbers: bool,

    /// Separate fields by a single space instead of aligning columns.
    #[arg(long)]
    pub no_align: bool,
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// STAR files to summarize.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Arguments for the `show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Table to print, as [BLOCK@]PATH.
    #[arg(value_name = "LOCATOR")]
    pub table: TableLocator,

    /// Only print these columns. Can be used multiple times.
    #[arg(long = "column", value_name = "LABEL")]
    pub columns: Vec<String>,

    /// Print at most this many rows.
    #[arg(short = 'n', long, value_name = "INT")]
    pub limit: Option<usize>,
}

/// Arguments for the `filter` subcommand.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Table to filter, as [BLOCK@]PATH.
    #[arg(value_name = "LOCATOR")]
    pub table: TableLocator,

    /// Path for the output STAR file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Condition of the form 'LABEL OP VALUE' with OP one of
    /// ==, !=, <, <=, >, >=. Can be used multiple times.
    #[arg(short = 'w', long = "where", required = true, value_name = "EXPR")]
    pub conditions: Vec<String>,

    #[command(flatten)]
    pub writer: WriterArgs,
}

/// Arguments for the `sort` subcommand.
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Table to sort, as [BLOCK@]PATH.
    #[arg(value_name = "LOCATOR")]
    pub table: TableLocator,

    /// Path for the output STAR file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Column to sort by (e.g. rlnLogLikelihood).
    #[arg(short, long, required = true, value_name = "LABEL")]
    pub by: String,

    /// Sort from largest to smallest.
    #[arg(short, long)]
    pub descending: bool,

    #[command(flatten)]
    pub writer: WriterArgs,
}

/// Arguments for the `reformat` subcommand.
#[derive(Args, Debug)]
pub struct ReformatArgs {
    /// Input STAR file.
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output STAR file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub writer: WriterArgs,
}

/// Arguments for the `export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Table to export, as [BLOCK@]PATH.
    #[arg(value_name = "LOCATOR")]
    pub table: TableLocator,

    /// Path for the output file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Separate fields with tabs instead of commas.
    #[arg(long)]
    pub tsv: bool,
}

/// Arguments for the `defocus-groups` subcommand.
#[derive(Args, Debug)]
pub struct DefocusGroupsArgs {
    /// Particle table, as [BLOCK@]PATH.
    #[arg(value_name = "LOCATOR")]
    pub table: TableLocator,

    /// Path for the output STAR file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Largest defocus span of a group in Angstrom.
    #[arg(long, value_name = "FLOAT")]
    pub max_range: Option<f64>,

    /// Smallest number of particles in a group.
    #[arg(long, value_name = "INT")]
    pub min_particles: Option<usize>,

    #[command(flatten)]
    pub writer: WriterArgs,
}

/// Arguments for the `join-optics` subcommand.
#[derive(Args, Debug)]
pub struct JoinOpticsArgs {
    /// Relion 3.1 STAR file with an optics block.
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output STAR file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Data block that receives the optics columns.
    #[arg(short, long, default_value = "particles", value_name = "NAME")]
    pub block: String,

    /// Optics column to copy. Can be used multiple times; all columns are
    /// copied when omitted.
    #[arg(short, long = "label", value_name = "LABEL")]
    pub labels: Vec<String>,

    #[command(flatten)]
    pub writer: WriterArgs,
}
