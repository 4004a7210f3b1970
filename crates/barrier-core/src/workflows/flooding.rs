use crate::core::models::model::{Model, sort_by_fitness};
use crate::core::neighborhood::{Neighborhood, neighbor_lists};
use crate::core::pruning;
use crate::engine::config::FloodingConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::tasks;
use crate::forest::forest::{BarrierForest, Provenance};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Builds a forest by flooding a sampled trajectory.
///
/// The trajectory is pruned in a single streaming pass, sorted ascending by fitness, and
/// flooded over the neighbor graph induced by `config.neighbor_threshold`.
///
/// # Errors
///
/// Fails with [`EngineError::InsufficientModels`] for an empty trajectory and propagates any
/// internal consistency failure of the construction.
#[instrument(skip_all, name = "flooding_workflow")]
pub fn run<M: Model>(
    trajectory: Vec<M>,
    neighborhood: Arc<dyn Neighborhood<M>>,
    config: &FloodingConfig,
    reporter: &ProgressReporter,
) -> Result<BarrierForest<M>, EngineError> {
    info!(
        models = trajectory.len(),
        pruning_threshold = config.pruning_threshold,
        neighbor_threshold = config.neighbor_threshold,
        "Starting flooding workflow."
    );

    let models = prepare(
        trajectory,
        neighborhood.as_ref(),
        config.pruning_threshold,
        reporter,
    )?;
    let forest = flood_prepared(
        &models,
        &neighborhood,
        config.pruning_threshold,
        config.neighbor_threshold,
        reporter,
    )?;

    info!(
        trees = forest.number_of_trees(),
        leaves = forest.number_of_leaves(),
        "Flooding workflow complete."
    );
    Ok(forest)
}

/// Prunes (when the threshold is positive) and sorts a trajectory for flooding.
pub(crate) fn prepare<M: Model>(
    trajectory: Vec<M>,
    neighborhood: &dyn Neighborhood<M>,
    pruning_threshold: f64,
    reporter: &ProgressReporter,
) -> Result<Vec<M>, EngineError> {
    let input = trajectory.len();
    let mut models = if pruning_threshold > 0.0 {
        reporter.phase("Pruning", || {
            pruning::prune_streaming(trajectory, neighborhood, pruning_threshold)
        })?
    } else {
        trajectory
    };
    sort_by_fitness(&mut models);
    debug!(
        input,
        survivors = models.len(),
        "Trajectory prepared for flooding."
    );
    Ok(models)
}

/// Floods already prepared models at one neighbor threshold and wraps the cleaned result.
pub(crate) fn flood_prepared<M: Model>(
    models: &[M],
    neighborhood: &Arc<dyn Neighborhood<M>>,
    pruning_threshold: f64,
    neighbor_threshold: f64,
    reporter: &ProgressReporter,
) -> Result<BarrierForest<M>, EngineError> {
    let neighbors = neighbor_lists(neighborhood.as_ref(), models, neighbor_threshold, reporter);
    let construction = reporter.phase("Flooding", || {
        tasks::flooding::run(models, &neighbors, reporter)
    })?;
    let construction = reporter.phase("Cleaning", || construction.clean());

    BarrierForest::new(
        construction.arena,
        construction.roots,
        Arc::clone(neighborhood),
        Provenance {
            pruning_threshold,
            neighbor_threshold: Some(neighbor_threshold),
            models_used: models.len(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::conformation::Conformation;
    use crate::core::neighborhood::TorsionNeighborhood;
    use crate::engine::config::FloodingConfigBuilder;

    fn sample(points: &[(f64, f64)]) -> Vec<Conformation> {
        points
            .iter()
            .map(|&(angle, energy)| Conformation::recorded(vec![angle], energy))
            .collect()
    }

    fn config(pruning: f64, neighbor: f64) -> FloodingConfig {
        FloodingConfigBuilder::new()
            .pruning_threshold(pruning)
            .neighbor_threshold(neighbor)
            .build()
            .unwrap()
    }

    #[test]
    fn unsorted_trajectory_is_sorted_before_flooding() {
        // Two wells at 0 and 100 degrees, a ridge at 50, an isolated point at -120.
        let trajectory = sample(&[
            (50.0, 3.0),
            (100.0, -1.0),
            (25.0, 1.0),
            (0.0, -2.0),
            (75.0, 0.5),
            (-120.0, 4.0),
        ]);

        let forest = run(
            trajectory,
            Arc::new(TorsionNeighborhood::default()),
            &config(0.0, 30.0),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(forest.models_used(), 6);
        assert_eq!(forest.number_of_trees(), 2);
        let main = forest.tree(0).unwrap();
        assert_eq!(main.number_of_leaves(), 2);
        assert_eq!(main.root().value(), 3.0);
        assert_eq!(main.minimum().value(), -2.0);
        assert_eq!(forest.tree(1).unwrap().root().value(), 4.0);
        assert_eq!(forest.neighbor_threshold(), Some(30.0));
    }

    #[test]
    fn pruning_collapses_dense_samples() {
        let trajectory = sample(&[(0.0, 1.0), (0.5, 0.0), (1.0, 2.0), (90.0, 5.0)]);

        let forest = run(
            trajectory,
            Arc::new(TorsionNeighborhood::default()),
            &config(2.0, 10.0),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(forest.models_used(), 2);
        assert_eq!(forest.number_of_trees(), 2);
        assert_eq!(forest.minimum().value(), 0.0);
    }

    #[test]
    fn empty_trajectory_is_rejected() {
        let result = run(
            Vec::<Conformation>::new(),
            Arc::new(TorsionNeighborhood::default()),
            &config(0.0, 10.0),
            &ProgressReporter::new(),
        );

        assert!(matches!(
            result,
            Err(EngineError::InsufficientModels { found: 0, .. })
        ));
    }
}
