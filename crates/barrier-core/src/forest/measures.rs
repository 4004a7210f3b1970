use super::node::{NodeArena, NodeKey};
use crate::core::models::model::Model;
use crate::core::utils::compare::{definitely_greater, definitely_less};

/// Aggregate statistics of a single barrier tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeMeasures {
    /// Number of true leaves; absorbed models are not counted.
    pub number_of_leaves: usize,
    /// Lowest-valued node of the tree.
    pub minimum: NodeKey,
    /// Lowest-valued internal node, if the tree has one.
    pub minimum_barrier: Option<NodeKey>,
    /// Highest-valued internal node, if the tree has one.
    pub maximum_barrier: Option<NodeKey>,
    /// Sum of the values of all internal nodes.
    pub total_barrier_value: f64,
    /// Sum over internal nodes of `(value - forest minimum) * left weight * right weight`.
    pub total_connection_value: f64,
}

/// Aggregate statistics of a whole forest, reduced from its trees.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestMeasures {
    /// Per-tree measures, in tree order.
    pub trees: Vec<TreeMeasures>,
    pub number_of_leaves: usize,
    pub minimum: NodeKey,
    pub minimum_barrier: Option<NodeKey>,
    pub maximum_barrier: Option<NodeKey>,
    pub total_barrier_value: f64,
    pub total_connection_value: f64,
}

/// First phase: everything except the connection value, which needs the forest minimum.
pub(crate) fn measure_tree<M: Model>(arena: &NodeArena<M>, root: NodeKey) -> TreeMeasures {
    let mut number_of_leaves = 0;
    let mut minimum = root;
    let mut minimum_barrier: Option<NodeKey> = None;
    let mut maximum_barrier: Option<NodeKey> = None;
    let mut total_barrier_value = 0.0;

    for (key, node) in arena.subtree(root) {
        if definitely_less(node.value(), arena[minimum].value()) {
            minimum = key;
        }
        if node.is_leaf() {
            number_of_leaves += 1;
            continue;
        }

        total_barrier_value += node.value();
        match minimum_barrier {
            Some(current) if !definitely_less(node.value(), arena[current].value()) => {}
            _ => minimum_barrier = Some(key),
        }
        match maximum_barrier {
            Some(current) if !definitely_greater(node.value(), arena[current].value()) => {}
            _ => maximum_barrier = Some(key),
        }
    }

    TreeMeasures {
        number_of_leaves,
        minimum,
        minimum_barrier,
        maximum_barrier,
        total_barrier_value,
        total_connection_value: 0.0,
    }
}

/// Second phase: energy-weighted count of leaf pairs separated by each barrier, relative to
/// `reference`, the lowest value of the whole forest.
pub(crate) fn connection_value<M: Model>(
    arena: &NodeArena<M>,
    root: NodeKey,
    reference: f64,
) -> f64 {
    arena
        .subtree(root)
        .filter_map(|(_, node)| {
            let (left, right) = node.children()?;
            let pairs = (arena[left].weight() * arena[right].weight()) as f64;
            Some((node.value() - reference) * pairs)
        })
        .sum()
}

/// Runs both phases over all `roots` and reduces them to forest totals.
///
/// `roots` must not be empty.
pub(crate) fn measure_forest<M: Model>(arena: &NodeArena<M>, roots: &[NodeKey]) -> ForestMeasures {
    let mut trees: Vec<TreeMeasures> = roots
        .iter()
        .map(|&root| measure_tree(arena, root))
        .collect();

    let minimum = pick(arena, trees.iter().map(|t| Some(t.minimum)), definitely_less)
        .unwrap_or(roots[0]);
    let reference = arena[minimum].value();

    for (tree, &root) in trees.iter_mut().zip(roots) {
        tree.total_connection_value = connection_value(arena, root, reference);
    }

    ForestMeasures {
        number_of_leaves: trees.iter().map(|t| t.number_of_leaves).sum(),
        minimum,
        minimum_barrier: pick(arena, trees.iter().map(|t| t.minimum_barrier), definitely_less),
        maximum_barrier: pick(
            arena,
            trees.iter().map(|t| t.maximum_barrier),
            definitely_greater,
        ),
        total_barrier_value: trees.iter().map(|t| t.total_barrier_value).sum(),
        total_connection_value: trees.iter().map(|t| t.total_connection_value).sum(),
        trees,
    }
}

/// Picks the first candidate that no later candidate beats under `better`.
fn pick<M: Model>(
    arena: &NodeArena<M>,
    candidates: impl Iterator<Item = Option<NodeKey>>,
    better: fn(f64, f64) -> bool,
) -> Option<NodeKey> {
    candidates.flatten().fold(None, |best, key| match best {
        Some(current) if !better(arena[key].value(), arena[current].value()) => Some(current),
        _ => Some(key),
    })
}
