//! # Core Models Module
//!
//! This module defines the configuration abstraction the barrier forest algorithms operate on.
//!
//! ## Overview
//!
//! Every algorithm in the crate is generic over the [`model::Model`] contract: a configuration
//! with a list of torsion angles and a cached scalar fitness. The algorithms never look at how
//! the fitness is computed; they only order models by it and ask a neighborhood for distances.
//!
//! ## Key Components
//!
//! - [`model`] - The `Model` trait and tolerance-aware model ordering
//! - [`conformation`] - A torsion-angle conformation backed by a pluggable energy function
//!
//! ## Usage
//!
//! ```ignore
//! use barrierforest::core::models::conformation::Conformation;
//! use barrierforest::core::models::model::Model;
//!
//! let recorded = Conformation::recorded(vec![60.0, -120.0], -12.5);
//! assert_eq!(recorded.evaluate(), -12.5);
//! ```

pub mod conformation;
pub mod model;
