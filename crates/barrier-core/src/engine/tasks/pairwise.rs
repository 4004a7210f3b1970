use super::Construction;
use crate::core::connector::Connector;
use crate::core::models::model::Model;
use crate::core::utils::compare::definitely_greater;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::utils::disjoint_set::DisjointSet;
use crate::engine::utils::sequence::IdSequence;
use crate::forest::node::NodeArena;
use itertools::Itertools;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A potential merge: the barrier found between minima `from` and `to`.
#[derive(Debug)]
struct Candidate<M> {
    from: usize,
    to: usize,
    barrier: M,
    value: f64,
}

/// Builds barrier trees by merging explicit minima in order of their pairwise barriers.
///
/// Every pair of minima is connected once. The resulting barriers are processed from lowest to
/// highest; a barrier joining two not yet connected minima becomes the parent of their current
/// trees. Leaves get ids `0..n` in input order, internal nodes continue from `n`.
///
/// Construction stops when all minima share one tree or when the next barrier exceeds
/// `energy_threshold`. With an infinite threshold the result is a single tree with `n` leaves
/// and `n - 1` internal nodes.
///
/// # Errors
///
/// Fails with [`EngineError::InsufficientModels`] for fewer than two minima and with
/// [`EngineError::InvalidThreshold`] for a NaN threshold.
#[instrument(skip_all, name = "pairwise_construction")]
pub fn run<M, C>(
    minima: &[M],
    connector: &C,
    energy_threshold: f64,
    reporter: &ProgressReporter,
) -> Result<Construction<M>, EngineError>
where
    M: Model,
    C: Connector<M> + ?Sized,
{
    if minima.len() < 2 {
        return Err(EngineError::InsufficientModels {
            required: 2,
            found: minima.len(),
        });
    }
    if energy_threshold.is_nan() {
        return Err(EngineError::InvalidThreshold {
            name: "energy_threshold",
            value: energy_threshold,
        });
    }

    let n = minima.len();
    info!(minima = n, energy_threshold, "Starting pairwise construction.");

    let mut candidates = reporter.phase("Connecting minima", || {
        connect_all_pairs(minima, connector, reporter)
    });
    candidates.sort_by(|a, b| a.value.total_cmp(&b.value));

    let mut arena = NodeArena::new();
    let mut sequence = IdSequence::new();
    let mut representative: Vec<_> = minima
        .iter()
        .map(|minimum| arena.new_leaf(sequence.next_id(), minimum.clone()))
        .collect();
    let mut sets = DisjointSet::new(n);

    for candidate in candidates {
        if sets.sets() == 1 {
            break;
        }
        if definitely_greater(candidate.value, energy_threshold) {
            debug!(
                barrier = candidate.value,
                "Next barrier exceeds the energy threshold; stopping."
            );
            break;
        }

        let a = sets.find(candidate.from);
        let b = sets.find(candidate.to);
        if a == b {
            continue;
        }

        let node = arena.merge(
            sequence.next_id(),
            candidate.barrier,
            representative[a],
            representative[b],
        )?;
        let root = sets.union(a, b);
        representative[root] = node;
    }

    let mut roots = Vec::with_capacity(sets.sets());
    let mut seen = vec![false; n];
    for i in 0..n {
        let set = sets.find(i);
        if !seen[set] {
            seen[set] = true;
            roots.push(representative[set]);
        }
    }

    info!(
        trees = roots.len(),
        nodes = arena.len(),
        "Pairwise construction finished."
    );
    Ok(Construction { arena, roots })
}

fn connect_all_pairs<M, C>(
    minima: &[M],
    connector: &C,
    reporter: &ProgressReporter,
) -> Vec<Candidate<M>>
where
    M: Model,
    C: Connector<M> + ?Sized,
{
    let pairs: Vec<(usize, usize)> = (0..minima.len()).tuple_combinations().collect();
    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    let connect = |&(from, to): &(usize, usize)| {
        let barrier = connector.connect(&minima[from], &minima[to]);
        let value = barrier.evaluate();
        reporter.report(Progress::TaskIncrement);
        Candidate {
            from,
            to,
            barrier,
            value,
        }
    };

    #[cfg(not(feature = "parallel"))]
    let candidates = pairs.iter().map(connect).collect();

    #[cfg(feature = "parallel")]
    let candidates = pairs.par_iter().map(connect).collect();

    reporter.report(Progress::TaskFinish);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connector::LinearConnector;
    use crate::core::models::conformation::{Conformation, EnergyFunction};
    use crate::forest::node::NodeKey;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    /// Barrier between any two minima lies 10 above the higher one.
    struct MaxPlusTen;

    impl Connector<Conformation> for MaxPlusTen {
        fn connect(&self, from: &Conformation, to: &Conformation) -> Conformation {
            let angle = (from.angle(0) + to.angle(0)) / 2.0;
            Conformation::recorded(vec![angle], from.evaluate().max(to.evaluate()) + 10.0)
        }
    }

    fn minima(energies: &[f64]) -> Vec<Conformation> {
        energies
            .iter()
            .enumerate()
            .map(|(i, &e)| Conformation::recorded(vec![i as f64 * 30.0], e))
            .collect()
    }

    fn internal_nodes(construction: &Construction<Conformation>) -> Vec<NodeKey> {
        construction
            .arena
            .iter()
            .filter(|(_, node)| node.is_internal())
            .map(|(key, _)| key)
            .collect()
    }

    #[test]
    fn four_minima_merge_into_one_tree() {
        let construction = run(
            &minima(&[1.0, 2.0, 3.0, 4.0]),
            &MaxPlusTen,
            f64::INFINITY,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(construction.roots.len(), 1);
        let root = &construction.arena[construction.roots[0]];
        assert_eq!(root.value(), 14.0);
        assert_eq!(root.weight(), 4);
        assert_eq!(construction.arena.leaves(construction.roots[0]).len(), 4);
        assert_eq!(internal_nodes(&construction).len(), 3);
    }

    #[test]
    fn leaves_keep_input_order_ids() {
        let construction = run(
            &minima(&[3.0, 1.0, 2.0]),
            &MaxPlusTen,
            f64::INFINITY,
            &ProgressReporter::new(),
        )
        .unwrap();

        for (id, energy) in [(0, 3.0), (1, 1.0), (2, 2.0)] {
            let key = construction.arena.find(id).unwrap();
            assert!(construction.arena[key].is_leaf());
            assert_eq!(construction.arena[key].value(), energy);
        }
        let internal_ids: Vec<_> = internal_nodes(&construction)
            .into_iter()
            .map(|key| construction.arena[key].id())
            .sorted()
            .collect();
        assert_eq!(internal_ids, vec![3, 4]);
    }

    #[test]
    fn merges_follow_ascending_barriers() {
        let construction = run(
            &minima(&[1.0, 2.0, 3.0, 4.0]),
            &MaxPlusTen,
            f64::INFINITY,
            &ProgressReporter::new(),
        )
        .unwrap();
        let arena = &construction.arena;

        // Lowest barrier (12) joins minima 0 and 1, then 13 adds 2, then 14 adds 3.
        let first = arena.find(4).unwrap();
        assert_eq!(arena[first].value(), 12.0);
        let (left, right) = arena[first].children().unwrap();
        assert_eq!((arena[left].id(), arena[right].id()), (0, 1));

        let second = arena.find(5).unwrap();
        assert_eq!(arena[second].value(), 13.0);
        assert_eq!(arena[second].children(), Some((first, arena.find(2).unwrap())));
    }

    #[test]
    fn energy_threshold_splits_the_forest() {
        let construction = run(
            &minima(&[1.0, 2.0, 3.0, 4.0]),
            &MaxPlusTen,
            12.5,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(construction.roots.len(), 3);
        let weights: Vec<_> = construction
            .roots
            .iter()
            .map(|&root| construction.arena[root].weight())
            .collect();
        assert_eq!(weights, vec![2, 1, 1]);
    }

    #[test]
    fn barrier_equal_to_threshold_is_merged() {
        let construction = run(
            &minima(&[1.0, 2.0]),
            &MaxPlusTen,
            12.0,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(construction.roots.len(), 1);
    }

    #[test]
    fn fewer_than_two_minima_are_rejected() {
        let result = run(
            &minima(&[1.0]),
            &MaxPlusTen,
            f64::INFINITY,
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
    fn nan_threshold_is_rejected() {
        let result = run(
            &minima(&[1.0, 2.0]),
            &MaxPlusTen,
            f64::NAN,
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::InvalidThreshold { .. })));
    }

    #[test]
    fn random_landscape_yields_consistent_single_tree() {
        let landscape: Arc<dyn EnergyFunction> = Arc::new(|angles: &[f64]| {
            angles
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let a = a.to_radians();
                    ((i + 1) as f64 * a).sin() + 0.3 * (3.0 * a).cos()
                })
                .sum()
        });
        let mut rng = StdRng::seed_from_u64(7);
        let models: Vec<_> = (0..12)
            .map(|_| {
                let angles = (0..3).map(|_| rng.gen_range(-180.0..180.0)).collect();
                Conformation::new(angles, landscape.clone())
            })
            .collect();

        let construction = run(
            &models,
            &LinearConnector::new(16),
            f64::INFINITY,
            &ProgressReporter::new(),
        )
        .unwrap();
        let arena = &construction.arena;

        assert_eq!(construction.roots.len(), 1);
        assert_eq!(arena[construction.roots[0]].weight(), 12);
        assert_eq!(internal_nodes(&construction).len(), 11);
        for (_, node) in arena.iter() {
            assert_ne!(node.is_leaf(), node.is_internal());
            if let Some((left, right)) = node.children() {
                assert_ne!(left, right);
                assert_eq!(node.weight(), arena[left].weight() + arena[right].weight());
                assert!(node.value() >= arena[left].value().max(arena[right].value()));
            }
        }
    }
}
