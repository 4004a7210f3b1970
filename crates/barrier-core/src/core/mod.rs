//! # Core Module
//!
//! Stateless building blocks shared by every barrier forest construction.
//!
//! ## Architecture
//!
//! - **Configurations** ([`models`]) - The `Model` contract and the torsion-angle `Conformation`
//! - **Distances** ([`neighborhood`]) - Pluggable distance policy and neighbor-list computation
//! - **Transitions** ([`connector`]) - Barrier synthesis between two models
//! - **Deduplication** ([`pruning`]) - Batch and streaming removal of near-duplicate models
//! - **Numerics** ([`utils`]) - Tolerance-aware comparison used as the crate-wide order
//!
//! None of these components know how a fitness value is produced. Force fields, minimizers
//! and file formats live outside this crate and enter only through the `Model`,
//! `Neighborhood` and `Connector` traits.

pub mod connector;
pub mod models;
pub mod neighborhood;
pub mod pruning;
pub mod utils;
