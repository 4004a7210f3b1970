use super::forest::{BarrierForest, BarrierTree};
use crate::core::models::model::Model;
use serde::Serialize;

/// Serializable snapshot of one tree's measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TreeSummary {
    pub root_id: usize,
    pub root_value: f64,
    pub number_of_leaves: usize,
    pub minimum_id: usize,
    pub minimum_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_barrier_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_barrier_value: Option<f64>,
    pub total_barrier_value: f64,
    pub total_connection_value: f64,
}

/// Serializable snapshot of a forest's provenance and measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForestSummary {
    pub number_of_trees: usize,
    pub models_used: usize,
    pub pruning_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbor_threshold: Option<f64>,
    pub number_of_leaves: usize,
    pub minimum_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_barrier_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_barrier_value: Option<f64>,
    pub total_barrier_value: f64,
    pub total_connection_value: f64,
    pub trees: Vec<TreeSummary>,
}

impl<M: Model> From<BarrierTree<'_, M>> for TreeSummary {
    fn from(tree: BarrierTree<'_, M>) -> Self {
        Self {
            root_id: tree.root().id(),
            root_value: tree.root().value(),
            number_of_leaves: tree.number_of_leaves(),
            minimum_id: tree.minimum().id(),
            minimum_value: tree.minimum().value(),
            minimum_barrier_value: tree.minimum_barrier().map(|node| node.value()),
            maximum_barrier_value: tree.maximum_barrier().map(|node| node.value()),
            total_barrier_value: tree.total_barrier_value(),
            total_connection_value: tree.total_connection_value(),
        }
    }
}

impl<M: Model> BarrierForest<M> {
    pub fn summary(&self) -> ForestSummary {
        ForestSummary {
            number_of_trees: self.number_of_trees(),
            models_used: self.models_used(),
            pruning_threshold: self.pruning_threshold(),
            neighbor_threshold: self.neighbor_threshold(),
            number_of_leaves: self.number_of_leaves(),
            minimum_value: self.minimum().value(),
            minimum_barrier_value: self.minimum_barrier().map(|node| node.value()),
            maximum_barrier_value: self.maximum_barrier().map(|node| node.value()),
            total_barrier_value: self.total_barrier_value(),
            total_connection_value: self.total_connection_value(),
            trees: self.trees().map(TreeSummary::from).collect(),
        }
    }
}
