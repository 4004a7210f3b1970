use crate::core::models::model::Model;
use crate::engine::error::EngineError;
use nalgebra::Point2;
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use std::ops::Index;

new_key_type! {
    /// Arena handle of a [`Node`]. Distinct from the node's public [`Node::id`].
    pub struct NodeKey;
}

/// One vertex of a barrier tree.
///
/// A leaf holds a local minimum. An internal node holds the barrier (saddle) model that joins
/// its two children; its value is the energy that has to be overcome to move between any leaf
/// of the left subtree and any leaf of the right subtree.
#[derive(Debug, Clone)]
pub struct Node<M> {
    /// Public identifier, unique within one arena.
    id: usize,
    /// The configuration this node stands for.
    model: M,
    /// Cached fitness of `model`.
    value: f64,
    /// Both children, or neither.
    children: Option<(NodeKey, NodeKey)>,
    /// Non-owning back-reference, set only by the node adopting this one.
    parent: Option<NodeKey>,
    /// Number of leaves in this subtree.
    weight: usize,
    /// Models absorbed into this basin without creating a node of their own.
    additional_models: Vec<M>,
    /// Layout position, owned by whatever draws the tree.
    position: Point2<f64>,
    /// Display color, owned by whatever draws the tree.
    color: Option<[u8; 3]>,
}

impl<M: Model> Node<M> {
    fn new(id: usize, model: M, children: Option<(NodeKey, NodeKey)>, weight: usize) -> Self {
        let value = model.evaluate();
        Self {
            id,
            model,
            value,
            children,
            parent: None,
            weight,
            additional_models: Vec::new(),
            position: Point2::origin(),
            color: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn weight(&self) -> usize {
        self.weight
    }

    pub fn left(&self) -> Option<NodeKey> {
        self.children.map(|(left, _)| left)
    }

    pub fn right(&self) -> Option<NodeKey> {
        self.children.map(|(_, right)| right)
    }

    pub fn children(&self) -> Option<(NodeKey, NodeKey)> {
        self.children
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_internal(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn additional_models(&self) -> &[M] {
        &self.additional_models
    }

    pub fn number_of_additional_models(&self) -> usize {
        self.additional_models.len()
    }

    pub fn has_additional_models(&self) -> bool {
        !self.additional_models.is_empty()
    }

    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    pub fn set_position(&mut self, position: Point2<f64>) {
        self.position = position;
    }

    pub fn color(&self) -> Option<[u8; 3]> {
        self.color
    }

    pub fn set_color(&mut self, color: Option<[u8; 3]>) {
        self.color = color;
    }
}

/// Storage for the nodes of one or more barrier trees.
///
/// Nodes refer to each other through [`NodeKey`]s, so parent back-references never own
/// anything. Structural mutation (creating nodes, adopting children, absorbing models,
/// cleaning) is confined to the crate; afterwards the arena is only read.
#[derive(Debug, Clone)]
pub struct NodeArena<M> {
    /// Primary node storage.
    nodes: SlotMap<NodeKey, Node<M>>,
    /// Lookup from public id to arena key.
    ids: HashMap<usize, NodeKey>,
}

impl<M> Default for NodeArena<M> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            ids: HashMap::new(),
        }
    }
}

impl<M: Model> NodeArena<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: NodeKey) -> Option<&Node<M>> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut Node<M>> {
        self.nodes.get_mut(key)
    }

    /// Finds the arena key of the node with public id `id`.
    pub fn find(&self, id: usize) -> Option<NodeKey> {
        self.ids.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node<M>)> {
        self.nodes.iter()
    }

    /// Creates a leaf for a local minimum.
    pub(crate) fn new_leaf(&mut self, id: usize, model: M) -> NodeKey {
        let key = self.nodes.insert(Node::new(id, model, None, 1));
        self.ids.insert(id, key);
        key
    }

    /// Creates an internal node holding `barrier` and adopts the two subtrees.
    ///
    /// Both children must exist, differ from each other, and not have a parent yet.
    pub(crate) fn merge(
        &mut self,
        id: usize,
        barrier: M,
        left: NodeKey,
        right: NodeKey,
    ) -> Result<NodeKey, EngineError> {
        if left == right {
            return Err(EngineError::Internal(format!(
                "cannot merge node {} with itself",
                self.id_of(left)
            )));
        }
        let weight = self.adoptable(left)? + self.adoptable(right)?;

        let key = self
            .nodes
            .insert(Node::new(id, barrier, Some((left, right)), weight));
        self.nodes[left].parent = Some(key);
        self.nodes[right].parent = Some(key);
        self.ids.insert(id, key);
        Ok(key)
    }

    /// Records `model` as a member of the basin represented by `key`.
    pub(crate) fn absorb(&mut self, key: NodeKey, model: M) -> Result<(), EngineError> {
        let node = self.nodes.get_mut(key).ok_or_else(|| {
            EngineError::Internal("cannot absorb a model into a missing node".to_string())
        })?;
        node.additional_models.push(model);
        Ok(())
    }

    /// Moves `models` onto the node at `key`, which must be live.
    pub(crate) fn extend_models(&mut self, key: NodeKey, models: impl IntoIterator<Item = M>) {
        self.nodes[key].additional_models.extend(models);
    }

    fn adoptable(&self, key: NodeKey) -> Result<usize, EngineError> {
        let node = self
            .nodes
            .get(key)
            .ok_or_else(|| EngineError::Internal("merge refers to a missing node".to_string()))?;
        if node.parent.is_some() {
            return Err(EngineError::Internal(format!(
                "node {} already has a parent",
                node.id
            )));
        }
        Ok(node.weight)
    }

    fn id_of(&self, key: NodeKey) -> usize {
        self.nodes.get(key).map_or(usize::MAX, |node| node.id)
    }

    /// Follows parent references up to the root of the tree containing `key`.
    pub fn root_of(&self, key: NodeKey) -> NodeKey {
        let mut current = key;
        while let Some(parent) = self.nodes.get(current).and_then(|node| node.parent) {
            current = parent;
        }
        current
    }

    /// The chain of keys from the root of `key`'s tree down to `key`, both inclusive.
    pub fn path_from_root(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut path = vec![key];
        let mut current = key;
        while let Some(parent) = self.nodes.get(current).and_then(|node| node.parent) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Pre-order traversal (node, left subtree, right subtree) of the subtree at `key`.
    pub fn subtree(&self, key: NodeKey) -> Subtree<'_, M> {
        let stack = if self.nodes.contains_key(key) {
            vec![key]
        } else {
            Vec::new()
        };
        Subtree { arena: self, stack }
    }

    /// Keys of the leaves below `key`, left to right.
    pub fn leaves(&self, key: NodeKey) -> Vec<NodeKey> {
        self.subtree(key)
            .filter(|(_, node)| node.is_leaf())
            .map(|(key, _)| key)
            .collect()
    }

    /// Removes a node, returning its model and absorbed models.
    pub(crate) fn remove(&mut self, key: NodeKey) -> Option<(M, Vec<M>)> {
        let node = self.nodes.remove(key)?;
        if self.ids.get(&node.id) == Some(&key) {
            self.ids.remove(&node.id);
        }
        Some((node.model, node.additional_models))
    }

    pub(crate) fn set_structure(
        &mut self,
        key: NodeKey,
        children: Option<(NodeKey, NodeKey)>,
        weight: usize,
    ) {
        let node = &mut self.nodes[key];
        node.children = children;
        node.weight = weight;
    }

    pub(crate) fn set_parent(&mut self, key: NodeKey, parent: Option<NodeKey>) {
        self.nodes[key].parent = parent;
    }
}

impl<M> Index<NodeKey> for NodeArena<M> {
    type Output = Node<M>;

    fn index(&self, key: NodeKey) -> &Self::Output {
        &self.nodes[key]
    }
}

/// Iterator returned by [`NodeArena::subtree`].
pub struct Subtree<'a, M> {
    arena: &'a NodeArena<M>,
    stack: Vec<NodeKey>,
}

impl<'a, M> Iterator for Subtree<'a, M> {
    type Item = (NodeKey, &'a Node<M>);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.stack.pop()?;
        let node = &self.arena.nodes[key];
        if let Some((left, right)) = node.children {
            self.stack.push(right);
            self.stack.push(left);
        }
        Some((key, node))
    }
}
