use super::Construction;
use crate::core::models::model::{Model, is_strictly_ascending};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::utils::disjoint_set::DisjointSet;
use crate::engine::utils::sequence::IdSequence;
use crate::forest::node::{NodeArena, NodeKey};
use tracing::{info, instrument, trace, warn};

/// Builds barrier trees by flooding an ascending trajectory (watershed).
///
/// Models are visited in the given order, which must be ascending by fitness. For model `i`
/// the distinct basins already reached by its neighbors decide what happens:
///
/// - no basin: `i` is a new local minimum and becomes a leaf with id `i`;
/// - one basin: `i` is absorbed into that basin as an additional model;
/// - several basins: `i` is a saddle. The basins are folded pairwise under new nodes that all
///   carry model `i`: the first two basins merge under a node with id `i`, every further basin
///   joins the previous merge under a node with the next id from `n` upwards.
///
/// Neighbor lists are indexed like `models`. Entries pointing at models not yet visited are
/// ignored, so symmetric lists are fine.
///
/// Input that is not strictly ascending is processed anyway, but can produce saddles lower
/// than the basins they join; a warning is logged.
///
/// # Errors
///
/// Fails for an empty trajectory, a neighbor list count different from the model count, or a
/// neighbor index out of range.
#[instrument(skip_all, name = "flooding_construction")]
pub fn run<M: Model>(
    models: &[M],
    neighbors: &[Vec<usize>],
    reporter: &ProgressReporter,
) -> Result<Construction<M>, EngineError> {
    let n = models.len();
    if n == 0 {
        return Err(EngineError::InsufficientModels {
            required: 1,
            found: 0,
        });
    }
    if neighbors.len() != n {
        return Err(EngineError::NeighborListMismatch {
            lists: neighbors.len(),
            models: n,
        });
    }
    for (model, list) in neighbors.iter().enumerate() {
        if let Some(&neighbor) = list.iter().find(|&&j| j >= n) {
            return Err(EngineError::NeighborOutOfRange { model, neighbor });
        }
    }
    if !is_strictly_ascending(models) {
        warn!("Flooding input is not strictly ascending by fitness; saddles may undercut basins.");
    }

    info!(models = n, "Starting flooding construction.");
    reporter.report(Progress::TaskStart {
        total_steps: n as u64,
    });

    let mut arena = NodeArena::new();
    let mut extra_ids = IdSequence::starting_at(n);
    let mut sets = DisjointSet::new(n);
    let mut basin: Vec<Option<NodeKey>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut absorbed = 0usize;

    for (i, model) in models.iter().enumerate() {
        let mut reached: Vec<usize> = Vec::new();
        for &j in &neighbors[i] {
            if j == i || !visited[j] {
                continue;
            }
            let set = sets.find(j);
            if !reached.contains(&set) {
                reached.push(set);
            }
        }

        match reached.as_slice() {
            [] => {
                basin[i] = Some(arena.new_leaf(i, model.clone()));
            }
            [set] => {
                let node = basin_of(&basin, *set)?;
                arena.absorb(node, model.clone())?;
                let root = sets.union(*set, i);
                basin[root] = Some(node);
                absorbed += 1;
            }
            [first, rest @ ..] => {
                trace!(model = i, basins = reached.len(), "Saddle joins basins.");
                let mut set = *first;
                let mut node = basin_of(&basin, set)?;
                for (k, &other) in rest.iter().enumerate() {
                    let id = if k == 0 { i } else { extra_ids.next_id() };
                    node = arena.merge(id, model.clone(), node, basin_of(&basin, other)?)?;
                    set = sets.union(set, other);
                    basin[set] = Some(node);
                }
                let root = sets.union(set, i);
                basin[root] = Some(node);
            }
        }

        visited[i] = true;
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let mut roots = Vec::with_capacity(sets.sets());
    let mut seen = vec![false; n];
    for i in 0..n {
        let set = sets.find(i);
        if !seen[set] {
            seen[set] = true;
            roots.push(basin_of(&basin, set)?);
        }
    }

    info!(
        trees = roots.len(),
        nodes = arena.len(),
        absorbed,
        "Flooding construction finished."
    );
    Ok(Construction { arena, roots })
}

fn basin_of(basin: &[Option<NodeKey>], set: usize) -> Result<NodeKey, EngineError> {
    basin[set].ok_or_else(|| {
        EngineError::Internal(format!("set {set} has no representative basin node"))
    })
}
