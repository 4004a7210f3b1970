use super::flooding::{flood_prepared, prepare};
use crate::core::models::model::Model;
use crate::core::neighborhood::Neighborhood;
use crate::engine::config::{SearchConfig, SearchTarget};
use crate::engine::error::{EngineError, ensure_threshold};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::forest::forest::BarrierForest;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of a threshold search: the smallest threshold found and the forest flooded at it.
pub struct SearchResult<M: Model> {
    pub threshold: f64,
    pub target_reached: bool,
    pub forest: BarrierForest<M>,
}

impl SearchTarget {
    fn is_met<M: Model>(self, forest: &BarrierForest<M>) -> bool {
        match self {
            SearchTarget::SingleTree => forest.number_of_trees() == 1,
            SearchTarget::SingleLeaf => forest.number_of_leaves() == 1,
        }
    }
}

/// Bisects the neighbor threshold until flooding collapses the trajectory into the target.
///
/// The interval is `[0, upper]`, where `upper` is the configured bound or the neighborhood's
/// maximum distance for the lowest model. The trajectory is pruned and sorted once; every
/// iteration floods it again at the midpoint and keeps the upper half if the target is met
/// there, the lower half otherwise.
///
/// If the target is not met even at `upper`, the forest flooded at `upper` is returned with
/// `target_reached == false`.
///
/// # Errors
///
/// Fails for an empty trajectory or a negative upper bound, and propagates construction
/// failures.
#[instrument(skip_all, name = "threshold_search_workflow")]
pub fn run<M: Model>(
    trajectory: Vec<M>,
    neighborhood: Arc<dyn Neighborhood<M>>,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<SearchResult<M>, EngineError> {
    let models = prepare(
        trajectory,
        neighborhood.as_ref(),
        config.pruning_threshold,
        reporter,
    )?;
    let Some(first) = models.first() else {
        return Err(EngineError::InsufficientModels {
            required: 1,
            found: 0,
        });
    };
    let upper = config
        .upper_bound
        .unwrap_or_else(|| neighborhood.maximum_distance(first));
    ensure_threshold("upper_bound", upper)?;

    info!(
        models = models.len(),
        upper,
        iterations = config.iterations,
        target = ?config.target,
        "Starting threshold search."
    );

    let flood = |threshold: f64| {
        flood_prepared(
            &models,
            &neighborhood,
            config.pruning_threshold,
            threshold,
            reporter,
        )
    };

    let mut best = flood(upper)?;
    let target_reached = config.target.is_met(&best);
    if !target_reached {
        warn!(
            upper,
            trees = best.number_of_trees(),
            leaves = best.number_of_leaves(),
            "Search target is not reached even at the upper bound."
        );
        return Ok(SearchResult {
            threshold: upper,
            target_reached,
            forest: best,
        });
    }

    let (mut low, mut high) = (0.0, upper);
    for iteration in 0..config.iterations {
        let middle = 0.5 * (low + high);
        let forest = flood(middle)?;
        let met = config.target.is_met(&forest);
        debug!(
            iteration,
            threshold = middle,
            trees = forest.number_of_trees(),
            leaves = forest.number_of_leaves(),
            met,
            "Search step."
        );
        reporter.report(Progress::Message(format!(
            "threshold {middle:.6}: {} tree(s), {} leaf/leaves",
            forest.number_of_trees(),
            forest.number_of_leaves()
        )));
        if met {
            high = middle;
            best = forest;
        } else {
            low = middle;
        }
    }

    info!(threshold = high, "Threshold search complete.");
    Ok(SearchResult {
        threshold: high,
        target_reached,
        forest: best,
    })
}
