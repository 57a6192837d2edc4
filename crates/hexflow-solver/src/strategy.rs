//! Cycle strategy trait.
//!
//! Defines the interface for advancing the mesh state by one Lagrange
//! cycle. Implementations differ only in how the work is scheduled.

use hexflow_mesh::MeshState;
use hexflow_types::HydroResult;

use crate::constraints::ConstraintBounds;

/// Advances a [`MeshState`] by one explicit Lagrange cycle.
///
/// A cycle computes nodal forces, integrates nodes, updates element
/// kinematics and the material state, and returns the Courant and hydro
/// timestep bounds for the next step. A geometry failure
/// (`VolumeError`, `ElementDegenerate`, `QStop`) aborts the cycle with
/// `Err`; the element thermodynamic state is then left as it was at the
/// start of the cycle.
///
/// # Example
///
/// ```
/// use hexflow_mesh::generators::{sedov_cube, SedovConfig};
/// use hexflow_solver::{LagrangeStrategy, SerialLeapfrog};
///
/// let mut state = sedov_cube(&SedovConfig::small(3)).unwrap();
/// let dt = state.clock.deltatime;
/// let mut strategy = SerialLeapfrog::new();
/// let bounds = strategy.advance_cycle(&mut state, dt).unwrap();
/// assert!(bounds.courant > 0.0);
/// ```
pub trait LagrangeStrategy: Send {
    /// Runs one cycle with timestep `dt`.
    fn advance_cycle(&mut self, state: &mut MeshState, dt: f64) -> HydroResult<ConstraintBounds>;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Worker threads the strategy runs on.
    fn num_threads(&self) -> usize {
        1
    }
}
