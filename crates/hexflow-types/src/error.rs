//! Error types for the hexflow engine.
//!
//! All crates return `HydroResult<T>` from fallible operations.

use thiserror::Error;

use crate::ids::ElemId;

/// Unified error type for the hexflow engine.
#[derive(Debug, Error)]
pub enum HydroError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Relative volume (or the hourglass determinant `volo * v`) is not positive.
    #[error("Volume error at element {elem}: relative volume {volume:.6e} is not positive")]
    VolumeError {
        elem: ElemId,
        volume: f64,
    },

    /// The shape-function Jacobian of an element collapsed.
    #[error("Degenerate element {elem}: Jacobian determinant {determinant:.6e}")]
    ElementDegenerate {
        elem: ElemId,
        determinant: f64,
    },

    /// Artificial viscosity exceeded `qstop`.
    #[error("Artificial viscosity {q:.6e} at element {elem} exceeds qstop")]
    QStop {
        elem: ElemId,
        q: f64,
    },

    /// The task scheduler could not be built or a phase lost a chunk.
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl HydroError {
    /// Returns true for errors that abort a run because the mesh state
    /// is no longer physically consistent.
    pub fn is_fatal_geometry(&self) -> bool {
        matches!(
            self,
            HydroError::VolumeError { .. }
                | HydroError::ElementDegenerate { .. }
                | HydroError::QStop { .. }
        )
    }
}

/// Convenience alias for `Result<T, HydroError>`.
pub type HydroResult<T> = Result<T, HydroError>;
