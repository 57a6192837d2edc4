//! Scalar type alias for the simulation.
//!
//! The kernels are written against `f64`; the hourglass and EOS cutoffs
//! (1e-7, 1e-36 floors) are meaningless in single precision.

/// The floating-point type used throughout the simulation.
pub type Real = f64;
