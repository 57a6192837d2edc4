//! Force pipeline.
//!
//! Each element computes its eight stress and eight hourglass corner
//! forces into element-indexed scratch (slot `elem * 8 + local`). No two
//! elements write the same slot, so element chunks run without locks.
//! The per-node sum happens afterwards in [`combine_corner_forces`],
//! walking each node's corner list in a fixed order.

use std::ops::Range;

use glam::DVec3;
use hexflow_math::hourglass::{fb_hourglass_force, hourglass_basis, hourglass_coefficient};
use hexflow_math::normals::{elem_node_normals, stress_to_node_forces};
use hexflow_math::volume::volume_derivative;
use hexflow_math::{HexCorners, ShapeDerivatives};
use hexflow_mesh::{CornerAdjacency, ElemState, HexMesh, NodeState};
use hexflow_types::{ElemId, HydroError, HydroResult};

/// Read-only inputs of the force phase.
#[derive(Clone, Copy)]
pub struct ForceInputs<'a> {
    pub mesh: &'a HexMesh,
    pub nodes: &'a NodeState,
    pub elems: &'a ElemState,
    pub hgcoef: f64,
}

/// Corner forces of a diagonal stress `-(p + q)`.
///
/// Fails with `ElementDegenerate` when the Jacobian of the element is not
/// positive.
pub fn stress_corner_forces(elem: usize, x: &HexCorners, p: f64, q: f64) -> HydroResult<HexCorners> {
    let sigma = -p - q;
    let shape = ShapeDerivatives::compute(x);
    if shape.determinant <= 0.0 {
        return Err(HydroError::ElementDegenerate {
            elem: ElemId::from(elem),
            determinant: shape.determinant,
        });
    }
    let normals = elem_node_normals(x);
    Ok(stress_to_node_forces(&normals, sigma))
}

/// Flanagan–Belytschko anti-hourglass corner forces.
///
/// `determinant` is the current volume `volo * v`; a non-positive value
/// fails with `VolumeError`.
pub fn hourglass_corner_forces(
    elem: usize,
    x: &HexCorners,
    xd: &HexCorners,
    determinant: f64,
    sound_speed: f64,
    mass: f64,
    hgcoef: f64,
) -> HydroResult<HexCorners> {
    if determinant <= 0.0 {
        return Err(HydroError::VolumeError {
            elem: ElemId::from(elem),
            volume: determinant,
        });
    }
    let dvd = volume_derivative(x);
    let hourgam = hourglass_basis(x, &dvd, determinant);
    let coefficient = hourglass_coefficient(hgcoef, sound_speed, mass, determinant);
    Ok(fb_hourglass_force(xd, &hourgam, coefficient))
}

/// Fills the corner slots of the elements in `range`.
///
/// `stress` and `hourglass` cover exactly those elements:
/// `8 * range.len()` entries each, starting at slot `8 * range.start`.
/// Elements are processed in order and the first failure is returned.
pub fn corner_forces_chunk(
    inputs: &ForceInputs<'_>,
    range: Range<usize>,
    stress: &mut [DVec3],
    hourglass: &mut [DVec3],
) -> HydroResult<()> {
    let ForceInputs {
        mesh,
        nodes,
        elems,
        hgcoef,
    } = *inputs;
    let start = range.start;

    for elem in range {
        let local = elem - start;
        let connectivity = mesh.elem_nodes(elem);
        let x = nodes.gather_positions(connectivity);
        let xd = nodes.gather_velocities(connectivity);

        let f_stress = stress_corner_forces(elem, &x, elems.p[elem], elems.q[elem])?;
        let f_hourglass = hourglass_corner_forces(
            elem,
            &x,
            &xd,
            mesh.volo[elem] * elems.v[elem],
            elems.ss[elem],
            mesh.elem_mass[elem],
            hgcoef,
        )?;

        stress[local * 8..local * 8 + 8].copy_from_slice(&f_stress);
        hourglass[local * 8..local * 8 + 8].copy_from_slice(&f_hourglass);
    }
    Ok(())
}

/// Sums the corner forces of the nodes `start..start + force.len()`.
///
/// Every node adds stress then hourglass for each of its corners, in the
/// order of its adjacency list.
pub fn combine_corner_forces(
    adjacency: &CornerAdjacency,
    stress: &[DVec3],
    hourglass: &[DVec3],
    start: usize,
    force: &mut [DVec3],
) {
    for (i, f) in force.iter_mut().enumerate() {
        let mut sum = DVec3::ZERO;
        for &slot in adjacency.corners(start + i) {
            sum += stress[slot];
            sum += hourglass[slot];
        }
        *f = sum;
    }
}
