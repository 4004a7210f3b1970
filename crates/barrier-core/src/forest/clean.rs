use super::node::{NodeArena, NodeKey};
use crate::core::models::model::Model;
use crate::core::utils::compare::approx_eq;
use slotmap::SecondaryMap;
use tracing::trace;

impl<M: Model> NodeArena<M> {
    /// Removes spurious minima from the tree rooted at `root` and returns the new root.
    ///
    /// A leaf whose value equals its parent's value is not separated from its sibling by any
    /// barrier. Such a parent is replaced by the sibling subtree; the dropped leaf and the
    /// dropped barrier model become additional models of the sibling, so no configuration is
    /// lost for path reconstruction. The pass runs bottom-up, so a collapse can expose a new
    /// leaf/parent pair further up, and subtree weights are recomputed on the way.
    ///
    /// A tree without such pairs is left untouched and keeps its root.
    pub fn clean(&mut self, root: NodeKey) -> NodeKey {
        let internal: Vec<NodeKey> = self
            .subtree(root)
            .filter(|(_, node)| node.is_internal())
            .map(|(key, _)| key)
            .collect();

        let mut replaced: SecondaryMap<NodeKey, NodeKey> = SecondaryMap::new();
        let resolve = |replaced: &SecondaryMap<NodeKey, NodeKey>, key: NodeKey| {
            replaced.get(key).copied().unwrap_or(key)
        };

        // Reverse pre-order visits every child before its parent.
        for &key in internal.iter().rev() {
            let Some((left, right)) = self[key].children() else {
                continue;
            };
            let left = resolve(&replaced, left);
            let right = resolve(&replaced, right);
            let value = self[key].value();

            let collapse = if self[left].is_leaf() && approx_eq(self[left].value(), value) {
                Some((left, right))
            } else if self[right].is_leaf() && approx_eq(self[right].value(), value) {
                Some((right, left))
            } else {
                None
            };

            match collapse {
                Some((dropped, survivor)) => {
                    trace!(
                        parent = self[key].id(),
                        leaf = self[dropped].id(),
                        "Collapsing leaf level with its parent."
                    );
                    for removed in [dropped, key] {
                        if let Some((model, absorbed)) = self.remove(removed) {
                            self.extend_models(survivor, std::iter::once(model).chain(absorbed));
                        }
                    }
                    self.set_parent(survivor, None);
                    replaced.insert(key, survivor);
                }
                None => {
                    let weight = self[left].weight() + self[right].weight();
                    self.set_structure(key, Some((left, right)), weight);
                    self.set_parent(left, Some(key));
                    self.set_parent(right, Some(key));
                }
            }
        }

        let new_root = resolve(&replaced, root);
        self.set_parent(new_root, None);
        new_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::conformation::Conformation;

    fn conf(energy: f64) -> Conformation {
        Conformation::recorded(vec![energy], energy)
    }

    #[test]
    fn clean_without_equal_pairs_is_a_no_op() {
        let mut arena = NodeArena::new();
        let a = arena.new_leaf(0, conf(0.0));
        let b = arena.new_leaf(1, conf(1.0));
        let c = arena.new_leaf(2, conf(2.0));
        let ab = arena.merge(3, conf(5.0), a, b).unwrap();
        let root = arena.merge(4, conf(7.0), ab, c).unwrap();

        let cleaned = arena.clean(root);
        assert_eq!(cleaned, root);
        assert_eq!(arena[root].weight(), 3);
        assert_eq!(arena.len(), 5);
        assert_eq!(arena[root].children(), Some((ab, c)));
    }

    #[test]
    fn leaf_equal_to_parent_is_replaced_by_sibling() {
        let mut arena = NodeArena::new();
        let a = arena.new_leaf(0, conf(0.0));
        let b = arena.new_leaf(1, conf(5.0));
        let c = arena.new_leaf(2, conf(2.0));
        let ab = arena.merge(3, conf(5.0), a, b).unwrap();
        let root = arena.merge(4, conf(7.0), ab, c).unwrap();

        let cleaned = arena.clean(root);
        assert_eq!(cleaned, root);
        assert_eq!(arena[root].children(), Some((a, c)));
        assert_eq!(arena[root].weight(), 2);
        assert_eq!(arena[a].parent(), Some(root));
        assert!(arena.get(ab).is_none());
        assert!(arena.get(b).is_none());
        assert_eq!(arena.find(1), None);
        assert_eq!(arena[a].number_of_additional_models(), 2);
    }

    #[test]
    fn collapse_propagates_upwards() {
        let mut arena = NodeArena::new();
        let a = arena.new_leaf(0, conf(0.0));
        let b = arena.new_leaf(1, conf(3.0));
        let c = arena.new_leaf(2, conf(3.0));
        let ab = arena.merge(3, conf(3.0), a, b).unwrap();
        let root = arena.merge(4, conf(3.0), c, ab).unwrap();

        // `ab` collapses onto `a`, then `root` sees leaf `c` at its own value.
        let cleaned = arena.clean(root);
        assert_eq!(cleaned, a);
        assert!(arena[a].is_root());
        assert!(arena[a].is_leaf());
        assert_eq!(arena[a].weight(), 1);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[a].number_of_additional_models(), 4);
    }

    #[test]
    fn collapsed_nodes_hand_their_models_to_the_survivor() {
        let mut arena = NodeArena::new();
        let a = arena.new_leaf(0, conf(0.0));
        let b = arena.new_leaf(1, conf(2.0));
        arena.absorb(b, conf(1.5)).unwrap();
        let ab = arena.merge(2, conf(2.0), a, b).unwrap();
        arena.absorb(ab, conf(1.8)).unwrap();

        let cleaned = arena.clean(ab);
        assert_eq!(cleaned, a);
        let mut energies: Vec<f64> = arena[a]
            .additional_models()
            .iter()
            .map(|m| m.evaluate())
            .collect();
        energies.sort_by(f64::total_cmp);
        assert_eq!(energies, vec![1.5, 1.8, 2.0, 2.0]);
    }

    #[test]
    fn clean_is_idempotent() {
        let mut arena = NodeArena::new();
        let a = arena.new_leaf(0, conf(0.0));
        let b = arena.new_leaf(1, conf(4.0));
        let c = arena.new_leaf(2, conf(1.0));
        let ab = arena.merge(3, conf(4.0), a, b).unwrap();
        let root = arena.merge(4, conf(6.0), ab, c).unwrap();

        let first = arena.clean(root);
        let len = arena.len();
        let second = arena.clean(first);
        assert_eq!(first, second);
        assert_eq!(arena.len(), len);
        assert_eq!(arena[second].weight(), 2);
    }

    #[test]
    fn single_leaf_is_its_own_clean_root() {
        let mut arena = NodeArena::new();
        let a = arena.new_leaf(0, conf(0.0));
        assert_eq!(arena.clean(a), a);
    }
}
