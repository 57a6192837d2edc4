//! Element kinematics and monotonic-Q gradients.
//!
//! The kinematics pass updates the volume and strain-rate fields of one
//! element slab. Its continuation computes the directional gradients of
//! the same elements from the fresh `vnew`; the material phase reads
//! them across element boundaries, so they complete before it starts.

use hexflow_math::gradients::directional_gradients;
use hexflow_math::hex::sub_scaled;
use hexflow_math::strain::velocity_gradient;
use hexflow_math::volume::{characteristic_length, elem_volume};
use hexflow_math::{DirectionalGradients, ShapeDerivatives};
use hexflow_mesh::{HexMesh, HydroParams, KinematicsSlab, NodeState};
use hexflow_types::{ElemId, HydroError, HydroResult};

/// Read-only inputs of the kinematics phase.
#[derive(Clone, Copy)]
pub struct KinematicsInputs<'a> {
    pub mesh: &'a HexMesh,
    pub nodes: &'a NodeState,
    pub params: &'a HydroParams,
    pub dt: f64,
}

/// Updates `vnew`, `delv`, `arealg`, `vdov`, the deviatoric strain rate
/// and `v` for every element of the slab.
///
/// Fails with `VolumeError` at the first element whose new relative
/// volume (after the EOS bounds clamp) is not positive.
pub fn kinematics_slab(inputs: &KinematicsInputs<'_>, slab: &mut KinematicsSlab<'_>) -> HydroResult<()> {
    let KinematicsInputs {
        mesh,
        nodes,
        params,
        dt,
    } = *inputs;

    for i in 0..slab.len() {
        let elem = slab.start + i;
        let connectivity = mesh.elem_nodes(elem);
        let x = nodes.gather_positions(connectivity);
        let xd = nodes.gather_velocities(connectivity);

        let volume = elem_volume(&x);
        let vnew = volume / mesh.volo[elem];
        slab.vnew[i] = vnew;
        slab.delv[i] = vnew - slab.v[i];
        slab.arealg[i] = characteristic_length(&x, volume);

        // strain rate at the half step
        let x_half = sub_scaled(&x, &xd, 0.5 * dt);
        let shape = ShapeDerivatives::compute(&x_half);
        let rate = velocity_gradient(&xd, &shape);
        slab.vdov[i] = rate.trace();
        slab.strain[i] = rate.deviatoric();

        if vnew <= 0.0 {
            return Err(HydroError::VolumeError {
                elem: ElemId::from(elem),
                volume: vnew,
            });
        }
        let clamped = params.clamp_volume(vnew);
        if clamped <= 0.0 {
            return Err(HydroError::VolumeError {
                elem: ElemId::from(elem),
                volume: clamped,
            });
        }

        slab.v[i] = if (vnew - 1.0).abs() < params.v_cut {
            1.0
        } else {
            vnew
        };
    }
    Ok(())
}

/// Directional gradients of elements `start..start + out.len()`, using the
/// current volume `volo * vnew`.
pub fn gradients_chunk(
    mesh: &HexMesh,
    nodes: &NodeState,
    start: usize,
    vnew: &[f64],
    out: &mut [DirectionalGradients],
) {
    for (i, grad) in out.iter_mut().enumerate() {
        let elem = start + i;
        let connectivity = mesh.elem_nodes(elem);
        let x = nodes.gather_positions(connectivity);
        let xd = nodes.gather_velocities(connectivity);
        *grad = directional_gradients(&x, &xd, mesh.volo[elem] * vnew[i]);
    }
}
