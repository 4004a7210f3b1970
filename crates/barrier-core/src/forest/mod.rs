//! # Forest Module
//!
//! The barrier tree data model and the queries answered on top of it.
//!
//! ## Overview
//!
//! A barrier tree is a full binary merge tree: leaves are local minima, internal nodes are the
//! saddles at which two basins first become connected. A [`forest::BarrierForest`] holds the
//! independent trees produced by one construction, all stored in a single
//! [`node::NodeArena`] so that parent back-references are plain keys.
//!
//! ## Key Components
//!
//! - [`node`] - `Node`, `NodeKey` and the `NodeArena` that owns them
//! - [`clean`] - Removal of leaves that are not separated from their sibling by a barrier
//! - [`measures`] - Lazily computed per-tree and forest-wide statistics
//! - [`forest`] - `BarrierForest`, its provenance, and `BarrierTree` views
//! - [`path`] - Reconstruction of explicit trajectories between two stored nodes
//! - [`summary`] - Serializable snapshots for reporting

pub mod clean;
pub mod forest;
pub mod measures;
pub mod node;
pub mod path;
pub mod summary;
