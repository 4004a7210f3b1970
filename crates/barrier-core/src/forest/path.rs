use super::forest::BarrierForest;
use super::node::NodeKey;
use crate::core::models::model::Model;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use std::collections::VecDeque;
use tracing::{debug, instrument};

impl<M: Model> BarrierForest<M> {
    /// The deepest node that has both `from` and `to` in its subtree.
    ///
    /// If one node lies below the other, the upper one is returned. Returns `None` when the
    /// nodes live in different trees.
    pub fn split_node(&self, from: NodeKey, to: NodeKey) -> Option<NodeKey> {
        let from_path = self.arena().path_from_root(from);
        let to_path = self.arena().path_from_root(to);
        if from_path.first() != to_path.first() {
            return None;
        }
        from_path
            .iter()
            .zip(&to_path)
            .take_while(|(a, b)| a == b)
            .last()
            .map(|(&key, _)| key)
    }

    /// Reconstructs a trajectory of stored models leading from node `from_id` to node `to_id`.
    ///
    /// The candidate set is every model below the split node of the two nodes, including
    /// absorbed models. Neighbor lists over that set are recomputed at the forest's neighbor
    /// threshold and searched breadth-first, so the result has the fewest possible hops. The
    /// returned path starts with the model of `from_id` and ends with the model of `to_id`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::MissingNeighborThreshold`] if the forest has no neighbor threshold.
    /// - [`EngineError::NodeNotFound`] if either id is unknown.
    /// - [`EngineError::DifferentTrees`] if the nodes are not in the same tree.
    /// - [`EngineError::Disconnected`] if the search cannot reach `to_id`. This means the tree
    ///   claims a connection the neighbor graph does not have, i.e. the forest is inconsistent.
    #[instrument(skip(self), name = "find_connecting_models")]
    pub fn find_connecting_models(
        &self,
        from_id: usize,
        to_id: usize,
    ) -> Result<Vec<M>, EngineError> {
        let threshold = self
            .neighbor_threshold()
            .ok_or(EngineError::MissingNeighborThreshold)?;
        let from = self
            .find_key(from_id)
            .ok_or(EngineError::NodeNotFound(from_id))?;
        let to = self
            .find_key(to_id)
            .ok_or(EngineError::NodeNotFound(to_id))?;
        let split = self.split_node(from, to).ok_or(EngineError::DifferentTrees {
            from: from_id,
            to: to_id,
        })?;

        let mut candidates: Vec<M> = Vec::new();
        let mut source = None;
        let mut target = None;
        for (key, node) in self.arena().subtree(split) {
            if key == from {
                source = Some(candidates.len());
            }
            if key == to {
                target = Some(candidates.len());
            }
            candidates.push(node.model().clone());
            candidates.extend(node.additional_models().iter().cloned());
        }
        let (Some(source), Some(target)) = (source, target) else {
            return Err(EngineError::Internal(format!(
                "split node of {from_id} and {to_id} does not contain both nodes"
            )));
        };

        let neighbors =
            self.neighborhood()
                .calculate_neighbors(&candidates, threshold, &ProgressReporter::new());
        let path = breadth_first_path(&neighbors, source, target).ok_or(
            EngineError::Disconnected {
                from: from_id,
                to: to_id,
            },
        )?;

        debug!(
            candidates = candidates.len(),
            hops = path.len() - 1,
            "Connecting path reconstructed."
        );
        Ok(path.into_iter().map(|i| candidates[i].clone()).collect())
    }
}

/// Unweighted shortest path from `source` to `target` over adjacency lists, both inclusive.
pub(crate) fn breadth_first_path(
    neighbors: &[Vec<usize>],
    source: usize,
    target: usize,
) -> Option<Vec<usize>> {
    let mut predecessor: Vec<Option<usize>> = vec![None; neighbors.len()];
    let mut visited = vec![false; neighbors.len()];
    let mut queue = VecDeque::from([source]);
    visited[source] = true;

    while let Some(current) = queue.pop_front() {
        if current == target {
            let mut path = vec![target];
            let mut step = target;
            while let Some(previous) = predecessor[step] {
                path.push(previous);
                step = previous;
            }
            path.reverse();
            return Some(path);
        }
        for &next in &neighbors[current] {
            if !visited[next] {
                visited[next] = true;
                predecessor[next] = Some(current);
                queue.push_back(next);
            }
        }
    }
    None
}
