//! # Workflows Module
//!
//! End-to-end procedures that turn a list of models into a cleaned [`BarrierForest`].
//!
//! Each workflow validates its configuration, prunes near-duplicate inputs, runs one of the
//! construction tasks from [`crate::engine::tasks`], cleans the resulting trees and wraps them
//! together with their provenance:
//!
//! - **Pairwise** ([`pairwise`]) - explicit local minima joined by connector barriers.
//! - **Flooding** ([`flooding`]) - a sampled trajectory flooded in ascending fitness order.
//! - **Threshold search** ([`search`]) - bisection over neighbor thresholds until flooding
//!   collapses the trajectory into one tree or one leaf.
//!
//! [`BarrierForest`]: crate::forest::forest::BarrierForest

pub mod flooding;
pub mod pairwise;
pub mod search;
