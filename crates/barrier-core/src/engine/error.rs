use super::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("At least {required} models are required, but {found} were provided")]
    InsufficientModels { required: usize, found: usize },

    #[error("Threshold '{name}' must be a non-negative number, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Neighbor lists cover {lists} models, but {models} models were provided")]
    NeighborListMismatch { lists: usize, models: usize },

    #[error("Neighbor list of model {model} refers to unknown model {neighbor}")]
    NeighborOutOfRange { model: usize, neighbor: usize },

    #[error("No node with id {0} exists in the forest")]
    NodeNotFound(usize),

    #[error("Nodes {from} and {to} belong to different trees")]
    DifferentTrees { from: usize, to: usize },

    #[error("The forest was built without a neighbor threshold; paths cannot be reconstructed")]
    MissingNeighborThreshold,

    #[error("Nodes {from} and {to} share a tree but no neighbor path connects them")]
    Disconnected { from: usize, to: usize },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether this error signals a broken internal invariant rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Disconnected { .. } | Self::Internal(_))
    }
}

/// Rejects negative or NaN thresholds. Positive infinity is accepted.
pub(crate) fn ensure_threshold(name: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_nan() || value < 0.0 {
        return Err(EngineError::InvalidThreshold { name, value });
    }
    Ok(())
}
