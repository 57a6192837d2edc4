//! # hexflow-mesh
//!
//! The mesh state store: a static 8-node hexahedral mesh plus the mutable
//! per-node and per-element arrays the solver advances every cycle.
//!
//! ## Key Types
//!
//! - [`HexMesh`] — Static connectivity, reference volumes, masses, boundary
//!   conditions, node→corner adjacency and region membership.
//! - [`NodeState`] / [`ElemState`] — Structure-of-Arrays simulation state.
//! - [`MeshState`] — Everything one cycle reads and writes, plus the
//!   [`HydroParams`] and the [`SimClock`].
//! - [`generators::sedov_cube`] — The Sedov blast problem builder.

pub mod boundary;
pub mod generators;
pub mod mesh;
pub mod params;
pub mod regions;
pub mod state;
pub mod topology;

pub use boundary::{Axis, AxisBoundary, ElemBoundary, FaceCondition, SymmetryMask, SymmetryPlanes};
pub use generators::SedovConfig;
pub use mesh::HexMesh;
pub use params::HydroParams;
pub use regions::{Region, RegionSet};
pub use state::{ElemState, KinematicsSlab, MeshState, NodeSlab, NodeState, SimClock};
pub use topology::CornerAdjacency;
