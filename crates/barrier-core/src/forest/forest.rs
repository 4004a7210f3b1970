use super::measures::{ForestMeasures, TreeMeasures, measure_forest};
use super::node::{Node, NodeArena, NodeKey, Subtree};
use crate::core::models::model::Model;
use crate::core::neighborhood::Neighborhood;
use crate::engine::error::EngineError;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// How a forest was built: the thresholds and input size it shares across its trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Provenance {
    /// Distance under which input models were merged by pruning.
    pub pruning_threshold: f64,
    /// Distance under which models count as neighbors; needed for path queries.
    pub neighbor_threshold: Option<f64>,
    /// Number of input models that entered construction after pruning.
    pub models_used: usize,
}

/// An ordered, non-empty collection of independent barrier trees.
///
/// All trees live in one [`NodeArena`]. Aggregate measures are computed on first use and
/// cached; the structure itself is immutable once the forest exists, apart from the display
/// fields of its nodes.
pub struct BarrierForest<M: Model> {
    arena: NodeArena<M>,
    roots: Vec<NodeKey>,
    neighborhood: Arc<dyn Neighborhood<M>>,
    provenance: Provenance,
    measures: OnceLock<ForestMeasures>,
}

impl<M: Model> BarrierForest<M> {
    /// Wraps freshly built (and cleaned) trees.
    ///
    /// # Errors
    ///
    /// Fails if `roots` is empty, or if any root is missing from the arena or has a parent.
    pub fn new(
        arena: NodeArena<M>,
        roots: Vec<NodeKey>,
        neighborhood: Arc<dyn Neighborhood<M>>,
        provenance: Provenance,
    ) -> Result<Self, EngineError> {
        if roots.is_empty() {
            return Err(EngineError::Internal(
                "a forest needs at least one tree".to_string(),
            ));
        }
        for &root in &roots {
            match arena.get(root) {
                Some(node) if node.is_root() => {}
                Some(node) => {
                    return Err(EngineError::Internal(format!(
                        "tree root {} has a parent",
                        node.id()
                    )));
                }
                None => {
                    return Err(EngineError::Internal(
                        "tree root is missing from the arena".to_string(),
                    ));
                }
            }
        }
        Ok(Self {
            arena,
            roots,
            neighborhood,
            provenance,
            measures: OnceLock::new(),
        })
    }

    pub fn number_of_trees(&self) -> usize {
        self.roots.len()
    }

    pub fn tree(&self, index: usize) -> Option<BarrierTree<'_, M>> {
        (index < self.roots.len()).then_some(BarrierTree {
            forest: self,
            index,
        })
    }

    pub fn trees(&self) -> impl Iterator<Item = BarrierTree<'_, M>> {
        (0..self.roots.len()).map(move |index| BarrierTree {
            forest: self,
            index,
        })
    }

    pub fn arena(&self) -> &NodeArena<M> {
        &self.arena
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node<M>> {
        self.arena.get(key)
    }

    /// Mutable access for display purposes (position, color).
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node<M>> {
        self.arena.get_mut(key)
    }

    /// Finds a node by its public id.
    pub fn find(&self, id: usize) -> Option<&Node<M>> {
        self.arena.find(id).and_then(|key| self.arena.get(key))
    }

    pub fn find_key(&self, id: usize) -> Option<NodeKey> {
        self.arena.find(id)
    }

    /// Index of the tree containing `key`.
    pub fn tree_of(&self, key: NodeKey) -> Option<usize> {
        self.arena.get(key)?;
        let root = self.arena.root_of(key);
        self.roots.iter().position(|&r| r == root)
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn models_used(&self) -> usize {
        self.provenance.models_used
    }

    pub fn pruning_threshold(&self) -> f64 {
        self.provenance.pruning_threshold
    }

    pub fn neighbor_threshold(&self) -> Option<f64> {
        self.provenance.neighbor_threshold
    }

    pub fn neighborhood(&self) -> &dyn Neighborhood<M> {
        self.neighborhood.as_ref()
    }

    /// Computes all aggregate measures once and returns the cached result.
    ///
    /// Per-tree measures are computed first, then the forest minimum, then every tree's
    /// connection value relative to that minimum. Later calls return the cached value.
    pub fn calculate_measures(&self) -> &ForestMeasures {
        self.measures
            .get_or_init(|| measure_forest(&self.arena, &self.roots))
    }

    pub fn number_of_leaves(&self) -> usize {
        self.calculate_measures().number_of_leaves
    }

    pub fn minimum(&self) -> &Node<M> {
        &self.arena[self.calculate_measures().minimum]
    }

    pub fn minimum_barrier(&self) -> Option<&Node<M>> {
        self.calculate_measures()
            .minimum_barrier
            .map(|key| &self.arena[key])
    }

    pub fn maximum_barrier(&self) -> Option<&Node<M>> {
        self.calculate_measures()
            .maximum_barrier
            .map(|key| &self.arena[key])
    }

    pub fn total_barrier_value(&self) -> f64 {
        self.calculate_measures().total_barrier_value
    }

    pub fn total_connection_value(&self) -> f64 {
        self.calculate_measures().total_connection_value
    }
}

impl<M: Model> fmt::Debug for BarrierForest<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarrierForest")
            .field("trees", &self.roots.len())
            .field("nodes", &self.arena.len())
            .field("provenance", &self.provenance)
            .finish()
    }
}

/// A view of one tree of a [`BarrierForest`].
pub struct BarrierTree<'a, M: Model> {
    forest: &'a BarrierForest<M>,
    index: usize,
}

impl<M: Model> Clone for BarrierTree<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Model> Copy for BarrierTree<'_, M> {}

impl<'a, M: Model> BarrierTree<'a, M> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn root_key(&self) -> NodeKey {
        self.forest.roots[self.index]
    }

    pub fn root(&self) -> &'a Node<M> {
        &self.forest.arena[self.root_key()]
    }

    /// Pre-order traversal of every node of this tree.
    pub fn nodes(&self) -> Subtree<'a, M> {
        self.forest.arena.subtree(self.root_key())
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.forest.arena.get(key).is_some() && self.forest.arena.root_of(key) == self.root_key()
    }

    pub fn measures(&self) -> &'a TreeMeasures {
        &self.forest.calculate_measures().trees[self.index]
    }

    pub fn number_of_leaves(&self) -> usize {
        self.measures().number_of_leaves
    }

    pub fn minimum(&self) -> &'a Node<M> {
        &self.forest.arena[self.measures().minimum]
    }

    pub fn minimum_barrier(&self) -> Option<&'a Node<M>> {
        self.measures()
            .minimum_barrier
            .map(|key| &self.forest.arena[key])
    }

    pub fn maximum_barrier(&self) -> Option<&'a Node<M>> {
        self.measures()
            .maximum_barrier
            .map(|key| &self.forest.arena[key])
    }

    pub fn total_barrier_value(&self) -> f64 {
        self.measures().total_barrier_value
    }

    pub fn total_connection_value(&self) -> f64 {
        self.measures().total_connection_value
    }
}
