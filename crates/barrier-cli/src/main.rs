mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod table;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
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

    info!("barrier v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    configure_threads(cli.threads)?;

    let progress = if cli.quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };

    let result = match cli.command {
        Commands::Flood(args) => {
            info!("Dispatching to 'flood' command.");
            commands::flood::run(args, &progress)
        }
        Commands::Search(args) => {
            info!("Dispatching to 'search' command.");
            commands::search::run(args, &progress)
        }
        Commands::Path(args) => {
            info!("Dispatching to 'path' command.");
            commands::path::run(args, &progress)
        }
    };

    match &result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}

#[cfg(feature = "parallel")]
fn configure_threads(threads: Option<usize>) -> Result<()> {
    use crate::error::CliError;

    if let Some(num_threads) = threads {
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
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn configure_threads(threads: Option<usize>) -> Result<()> {
    if threads.is_some() {
        tracing::warn!("Built without the `parallel` feature; --threads is ignored.");
    }
    Ok(())
}
