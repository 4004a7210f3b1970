use super::{load, write_report};
use crate::cli::SearchArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use barrierforest::engine::config::SearchTarget;
use barrierforest::engine::progress::ProgressReporter;
use barrierforest::forest::summary::ForestSummary;
use barrierforest::workflows;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct SearchReport {
    target: SearchTarget,
    threshold: f64,
    target_reached: bool,
    forest: ForestSummary,
}

pub fn run(args: SearchArgs, progress: &CliProgressHandler) -> Result<()> {
    let input = load(&args.input)?;
    let config = input.config.search_config(&args)?;
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    info!(
        "Searching the {:?} threshold over {} models in {} iterations.",
        config.target,
        input.trajectory.len(),
        config.iterations
    );
    let result =
        workflows::search::run(input.trajectory, input.neighborhood, &config, &reporter)?;
    if !result.target_reached {
        warn!(
            "The target was not reached within the search interval; reporting the forest at {}.",
            result.threshold
        );
    }

    let report = SearchReport {
        target: config.target,
        threshold: result.threshold,
        target_reached: result.target_reached,
        forest: result.forest.summary(),
    };
    write_report(&report, args.output.as_deref())
}
