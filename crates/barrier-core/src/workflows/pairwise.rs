use crate::core::connector::Connector;
use crate::core::models::model::Model;
use crate::core::neighborhood::Neighborhood;
use crate::core::pruning;
use crate::engine::config::PairwiseConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::tasks;
use crate::forest::forest::{BarrierForest, Provenance};
use std::sync::Arc;
use tracing::{info, instrument};

/// Builds a forest from explicit local minima.
///
/// Minima closer than the pruning threshold are reduced to the better one, the survivors are
/// joined in ascending barrier order up to the energy threshold, and the trees are cleaned.
///
/// # Errors
///
/// Fails with [`EngineError::InsufficientModels`] when fewer than two minima are given or
/// survive pruning, and propagates any internal consistency failure of the construction.
#[instrument(skip_all, name = "pairwise_workflow")]
pub fn run<M: Model>(
    minima: Vec<M>,
    neighborhood: Arc<dyn Neighborhood<M>>,
    connector: &dyn Connector<M>,
    config: &PairwiseConfig,
    reporter: &ProgressReporter,
) -> Result<BarrierForest<M>, EngineError> {
    if minima.len() < 2 {
        return Err(EngineError::InsufficientModels {
            required: 2,
            found: minima.len(),
        });
    }

    info!(
        minima = minima.len(),
        pruning_threshold = config.pruning_threshold,
        energy_threshold = config.energy_threshold,
        "Starting pairwise workflow."
    );

    let survivors = reporter.phase("Pruning", || {
        pruning::prune(minima, neighborhood.as_ref(), config.pruning_threshold)
    })?;
    let models_used = survivors.len();

    let construction = reporter.phase("Barrier construction", || {
        tasks::pairwise::run(&survivors, connector, config.energy_threshold, reporter)
    })?;
    let construction = reporter.phase("Cleaning", || construction.clean());

    let forest = BarrierForest::new(
        construction.arena,
        construction.roots,
        neighborhood,
        Provenance {
            pruning_threshold: config.pruning_threshold,
            neighbor_threshold: config.neighbor_threshold,
            models_used,
        },
    )?;

    info!(
        trees = forest.number_of_trees(),
        leaves = forest.number_of_leaves(),
        "Pairwise workflow complete."
    );
    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connector::LinearConnector;
    use crate::core::models::conformation::{Conformation, EnergyFunction};
    use crate::core::neighborhood::{TorsionMetric, TorsionNeighborhood};
    use crate::engine::config::PairwiseConfigBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn landscape() -> Arc<dyn EnergyFunction> {
        // Two wells at -90 and 90 degrees separated by barriers at 0 and 180.
        Arc::new(|angles: &[f64]| (angles[0].to_radians() * 2.0).cos())
    }

    fn minima() -> Vec<Conformation> {
        let function = landscape();
        vec![
            Conformation::new(vec![-90.0], function.clone()),
            Conformation::new(vec![90.0], function.clone()),
            Conformation::new(vec![-89.5], function),
        ]
    }

    #[test]
    fn two_wells_join_under_the_lowest_barrier() {
        let config = PairwiseConfigBuilder::new()
            .pruning_threshold(1.0)
            .build()
            .unwrap();
        let forest = run(
            minima(),
            Arc::new(TorsionNeighborhood::new(TorsionMetric::MaxAbsolute)),
            &LinearConnector::new(36),
            &config,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(forest.models_used(), 2);
        assert_eq!(forest.number_of_trees(), 1);
        assert_eq!(forest.number_of_leaves(), 2);
        let root = forest.tree(0).unwrap().root();
        assert!((root.value() - 1.0).abs() < 1e-9);
        assert!((forest.minimum().value() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn energy_threshold_below_barrier_keeps_wells_apart() {
        let config = PairwiseConfigBuilder::new()
            .pruning_threshold(1.0)
            .energy_threshold(0.5)
            .build()
            .unwrap();
        let forest = run(
            minima(),
            Arc::new(TorsionNeighborhood::default()),
            &LinearConnector::new(36),
            &config,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(forest.number_of_trees(), 2);
        assert_eq!(forest.minimum_barrier().map(|node| node.id()), None);
    }

    #[test]
    fn too_few_minima_after_pruning_is_an_error() {
        let function = landscape();
        let config = PairwiseConfigBuilder::new()
            .pruning_threshold(5.0)
            .build()
            .unwrap();
        let result = run(
            vec![
                Conformation::new(vec![-90.0], function.clone()),
                Conformation::new(vec![-88.0], function),
            ],
            Arc::new(TorsionNeighborhood::default()),
            &LinearConnector::default(),
            &config,
            &ProgressReporter::new(),
        );

        assert!(matches!(
            result,
            Err(EngineError::InsufficientModels {
                required: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn single_minimum_is_rejected_before_any_phase_runs() {
        let events = Arc::new(AtomicUsize::new(0));
        let counter = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let config = PairwiseConfigBuilder::new()
            .pruning_threshold(1.0)
            .build()
            .unwrap();

        let result = run(
            vec![Conformation::new(vec![90.0], landscape())],
            Arc::new(TorsionNeighborhood::default()),
            &LinearConnector::default(),
            &config,
            &reporter,
        );

        assert!(matches!(
            result,
            Err(EngineError::InsufficientModels {
                required: 2,
                found: 1
            })
        ));
        assert_eq!(events.load(Ordering::SeqCst), 0);
    }
}
