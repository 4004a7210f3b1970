//! # Barrier Forest Core Library
//!
//! Coarse-grained descriptions of energy landscapes as forests of barrier trees.
//!
//! A barrier tree records how the basins of local minima merge as the energy rises: leaves are
//! minima, internal nodes are the saddles (barriers) at which two basins join. Sampled
//! landscapes that never fully connect yield several trees, a barrier forest.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** The `Model` contract with a torsion-angle implementation,
//!   neighborhood and connector policies, epsilon comparison, and pruning of near-duplicates.
//!
//! - **[`forest`]: The Data Structure.** Arena-backed nodes, tree cleaning, the
//!   `BarrierForest` with its lazily computed measures, and path reconstruction between
//!   nodes.
//!
//! - **[`engine`]: The Algorithms.** Pairwise (Kruskal-style) and flooding construction,
//!   configuration builders, errors, and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Complete procedures from raw models to a cleaned
//!   forest, including the neighbor threshold search.

pub mod core;
pub mod engine;
pub mod forest;
pub mod workflows;
