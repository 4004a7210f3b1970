//! # Engine Module
//!
//! Construction algorithms for barrier forests and the infrastructure around them.
//!
//! ## Architecture
//!
//! - **Tasks** ([`tasks`]) - the pairwise and flooding constructions, each producing raw
//!   trees in a fresh node arena.
//! - **Configuration** ([`config`]) - validated settings built through builders.
//! - **Progress Monitoring** ([`progress`]) - phase and task events for long computations.
//! - **Error Handling** ([`error`]) - the error type shared by all fallible operations.
//! - **Utilities** ([`utils`]) - the node id sequence and the disjoint-set structure used to
//!   track basin membership.

pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
pub mod utils;
