use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Parameter '{name}' must be a non-negative number, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Parameter '{name}' must be at least {minimum}, got {value}")]
    TooSmall {
        name: &'static str,
        minimum: usize,
        value: usize,
    },
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_nan() || value < 0.0 {
        Err(ConfigError::InvalidParameter { name, value })
    } else {
        Ok(value)
    }
}

/// Settings for the pairwise (Kruskal-style) construction over explicit minima.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseConfig {
    /// Minima closer than this are considered duplicates; the higher one is dropped.
    pub pruning_threshold: f64,
    /// Barriers above this energy are not merged. `+inf` yields a single tree.
    pub energy_threshold: f64,
    /// Neighbor threshold recorded on the forest for later path queries.
    pub neighbor_threshold: Option<f64>,
}

#[derive(Default)]
pub struct PairwiseConfigBuilder {
    pruning_threshold: Option<f64>,
    energy_threshold: Option<f64>,
    neighbor_threshold: Option<f64>,
}

impl PairwiseConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pruning_threshold(mut self, threshold: f64) -> Self {
        self.pruning_threshold = Some(threshold);
        self
    }
    pub fn energy_threshold(mut self, threshold: f64) -> Self {
        self.energy_threshold = Some(threshold);
        self
    }
    pub fn neighbor_threshold(mut self, threshold: f64) -> Self {
        self.neighbor_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> Result<PairwiseConfig, ConfigError> {
        let pruning_threshold = non_negative(
            "pruning_threshold",
            self.pruning_threshold
                .ok_or(ConfigError::MissingParameter("pruning_threshold"))?,
        )?;
        let energy_threshold = match self.energy_threshold {
            Some(value) if value.is_nan() => {
                return Err(ConfigError::InvalidParameter {
                    name: "energy_threshold",
                    value,
                });
            }
            Some(value) => value,
            None => f64::INFINITY,
        };
        let neighbor_threshold = self
            .neighbor_threshold
            .map(|value| non_negative("neighbor_threshold", value))
            .transpose()?;
        Ok(PairwiseConfig {
            pruning_threshold,
            energy_threshold,
            neighbor_threshold,
        })
    }
}

/// Settings for the flooding (watershed) construction over a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct FloodingConfig {
    /// Streaming pruning distance applied while reading the trajectory; `0` disables pruning.
    pub pruning_threshold: f64,
    /// Models within this distance are neighbors in the flooding graph.
    pub neighbor_threshold: f64,
}

#[derive(Default)]
pub struct FloodingConfigBuilder {
    pruning_threshold: Option<f64>,
    neighbor_threshold: Option<f64>,
}

impl FloodingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pruning_threshold(mut self, threshold: f64) -> Self {
        self.pruning_threshold = Some(threshold);
        self
    }
    pub fn neighbor_threshold(mut self, threshold: f64) -> Self {
        self.neighbor_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> Result<FloodingConfig, ConfigError> {
        Ok(FloodingConfig {
            pruning_threshold: non_negative(
                "pruning_threshold",
                self.pruning_threshold
                    .ok_or(ConfigError::MissingParameter("pruning_threshold"))?,
            )?,
            neighbor_threshold: non_negative(
                "neighbor_threshold",
                self.neighbor_threshold
                    .ok_or(ConfigError::MissingParameter("neighbor_threshold"))?,
            )?,
        })
    }
}

/// What the threshold search tries to collapse the trajectory into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchTarget {
    /// Every model ends up in one tree.
    SingleTree,
    /// The whole trajectory drains into one local minimum.
    SingleLeaf,
}

/// Settings for the bisection search over neighbor thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub pruning_threshold: f64,
    pub target: SearchTarget,
    pub iterations: usize,
    /// Upper end of the search interval; defaults to the neighborhood's maximum distance.
    pub upper_bound: Option<f64>,
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    pruning_threshold: Option<f64>,
    target: Option<SearchTarget>,
    iterations: Option<usize>,
    upper_bound: Option<f64>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pruning_threshold(mut self, threshold: f64) -> Self {
        self.pruning_threshold = Some(threshold);
        self
    }
    pub fn target(mut self, target: SearchTarget) -> Self {
        self.target = Some(target);
        self
    }
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }
    pub fn upper_bound(mut self, bound: f64) -> Self {
        self.upper_bound = Some(bound);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let iterations = self
            .iterations
            .ok_or(ConfigError::MissingParameter("iterations"))?;
        if iterations == 0 {
            return Err(ConfigError::TooSmall {
                name: "iterations",
                minimum: 1,
                value: iterations,
            });
        }
        Ok(SearchConfig {
            pruning_threshold: non_negative(
                "pruning_threshold",
                self.pruning_threshold
                    .ok_or(ConfigError::MissingParameter("pruning_threshold"))?,
            )?,
            target: self.target.ok_or(ConfigError::MissingParameter("target"))?,
            iterations,
            upper_bound: self
                .upper_bound
                .map(|value| non_negative("upper_bound", value))
                .transpose()?,
        })
    }
}
