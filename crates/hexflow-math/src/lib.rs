//! # hexflow-math
//!
//! Per-element math for 8-node hexahedra. Every function here is
//! stateless: it takes the element's gathered corner data and returns
//! a value, so the solver can call it from any chunk on any thread.
//!
//! Provides:
//! - Re-export of `glam::DVec3` as the canonical vector type
//! - Shape-function derivatives and Jacobian volume ([`shape`])
//! - Element volume, face area, characteristic length, volume derivatives ([`volume`])
//! - Face-area node normals and stress-to-force conversion ([`normals`])
//! - Flanagan–Belytschko hourglass basis and forces ([`hourglass`])
//! - Velocity gradient / strain rate ([`strain`])
//! - Directional position/velocity derivatives for monotonic Q ([`gradients`])
//!
//! Local node numbering follows the usual hex convention: nodes 0–3 on
//! the lower ζ face counter-clockwise, nodes 4–7 above them.

pub mod gradients;
pub mod hex;
pub mod hourglass;
pub mod normals;
pub mod shape;
pub mod strain;
pub mod volume;

// Re-export glam's double-precision vector as the canonical type.
pub use glam::DVec3;

pub use gradients::DirectionalGradients;
pub use hex::{gather, HexCorners};
pub use shape::ShapeDerivatives;
pub use strain::StrainRate;
