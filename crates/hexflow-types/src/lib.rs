//! # hexflow-types
//!
//! Shared types, identifiers, error types, and numerical constants
//! for the hexflow Lagrangian hydro engine.
//!
//! This crate has zero domain logic — it defines the vocabulary
//! that all other hexflow crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod scalar;

pub use error::{HydroError, HydroResult};
pub use ids::{ElemId, NodeId, RegionId};
pub use scalar::Real;
