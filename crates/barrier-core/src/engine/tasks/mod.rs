//! Forest construction algorithms.
//!
//! Each task turns a list of models into one or more barrier trees stored in a fresh
//! [`NodeArena`]. Tasks do not prune, clean, or compute measures; the workflows compose those
//! steps around them.

use crate::core::models::model::Model;
use crate::forest::node::{NodeArena, NodeKey};

pub mod flooding;
pub mod pairwise;

/// Raw output of a construction task: the arena and the roots of its trees, in order.
#[derive(Debug, Clone)]
pub struct Construction<M> {
    pub arena: NodeArena<M>,
    pub roots: Vec<NodeKey>,
}

impl<M: Model> Construction<M> {
    /// Applies [`NodeArena::clean`] to every tree.
    pub fn clean(mut self) -> Self {
        for root in &mut self.roots {
            *root = self.arena.clean(*root);
        }
        self
    }
}
