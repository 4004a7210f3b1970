use super::{load, write_report};
use crate::cli::FloodArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use barrierforest::engine::progress::ProgressReporter;
use barrierforest::workflows;
use tracing::info;

pub fn run(args: FloodArgs, progress: &CliProgressHandler) -> Result<()> {
    let input = load(&args.input)?;
    let config = input.config.flooding_config(args.neighbor_threshold)?;
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    info!(
        "Flooding {} models at neighbor threshold {}.",
        input.trajectory.len(),
        config.neighbor_threshold
    );
    let forest =
        workflows::flooding::run(input.trajectory, input.neighborhood, &config, &reporter)?;

    write_report(&forest.summary(), args.output.as_deref())
}
