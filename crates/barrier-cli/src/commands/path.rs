use super::load;
use crate::cli::PathArgs;
use crate::error::Result;
use crate::table;
use crate::utils::progress::CliProgressHandler;
use barrierforest::engine::progress::ProgressReporter;
use barrierforest::workflows;
use std::fs::File;
use tracing::info;

pub fn run(args: PathArgs, progress: &CliProgressHandler) -> Result<()> {
    let input = load(&args.input)?;
    let config = input.config.flooding_config(args.neighbor_threshold)?;
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    let forest =
        workflows::flooding::run(input.trajectory, input.neighborhood, &config, &reporter)?;
    let path = forest.find_connecting_models(args.from, args.to)?;
    info!(
        "Connected node {} to node {} in {} step(s).",
        args.from,
        args.to,
        path.len().saturating_sub(1)
    );

    match &args.output {
        Some(output) => table::write_models(File::create(output)?, &path),
        None => table::write_models(std::io::stdout().lock(), &path),
    }
}
