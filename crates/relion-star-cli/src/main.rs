mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("🚀 rstar v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    if let Some(num_threads) = cli.threads {
        info!(
            "Setting Rayon global thread pool to {} threads.",
            num_threads
        );
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
            })?;
    }

    let app_config = config::build_config(&cli)?;

    let command_result = match cli.command {
        Commands::Info(args) => {
            info!("Dispatching to 'info' command.");
            commands::info::run(args, &app_config)
        }
        Commands::Show(args) => {
            info!("Dispatching to 'show' command.");
            commands::show::run(args, &app_config)
        }
        Commands::Filter(args) => {
            info!("Dispatching to 'filter' command.");
            commands::filter::run(args, &app_config)
        }
        Commands::Sort(args) => {
            info!("Dispatching to 'sort' command.");
            commands::sort::run(args, &app_config)
        }
        Commands::Reformat(args) => {
            info!("Dispatching to 'reformat' command.");
            commands::reformat::run(args, &app_config)
        }
        Commands::Export(args) => {
            info!("Dispatching to 'export' command.");
            commands::export::run(args, &app_config)
        }
        Commands::DefocusGroups(args) => {
            info!("Dispatching to 'defocus-groups' command.");
            commands::defocus_groups::run(args, &app_config)
        }
        Commands::JoinOptics(args) => {
            info!("Dispatching to 'join-optics' command.");
            commands::join_optics::run(args, &app_config)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
