//! Single-threaded reference cycle.
//!
//! Runs the same kernels as [`TaskGraphLeapfrog`](crate::TaskGraphLeapfrog)
//! over whole ranges on the calling thread, with one EOS pass per element
//! and no region splitting.

use std::num::NonZeroUsize;

use glam::DVec3;
use hexflow_math::DirectionalGradients;
use hexflow_mesh::{HexMesh, MeshState};
use hexflow_types::HydroResult;

use crate::constraints::{reduce_all, ConstraintBounds};
use crate::force::{combine_corner_forces, corner_forces_chunk, ForceInputs};
use crate::integrate::{integrate_slab, NodeInputs};
use crate::kinematics::{gradients_chunk, kinematics_slab, KinematicsInputs};
use crate::material::{self, MaterialContext};
use crate::pool::BufferPool;
use crate::strategy::LagrangeStrategy;

/// Serial cycle engine.
#[derive(Debug, Default)]
pub struct SerialLeapfrog {
    corner_pool: BufferPool<DVec3>,
    gradient_pool: BufferPool<DirectionalGradients>,
}

impl SerialLeapfrog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn whole(len: usize) -> NonZeroUsize {
    NonZeroUsize::new(len).unwrap_or(NonZeroUsize::MIN)
}

impl LagrangeStrategy for SerialLeapfrog {
    fn advance_cycle(&mut self, state: &mut MeshState, dt: f64) -> HydroResult<ConstraintBounds> {
        let params = state.params;
        let MeshState {
            mesh, nodes, elems, ..
        } = state;
        let mesh: &HexMesh = mesh;
        let num_elem = mesh.num_elem();

        let mut stress = self.corner_pool.acquire(8 * num_elem);
        let mut hourglass = self.corner_pool.acquire(8 * num_elem);
        let inputs = ForceInputs {
            mesh,
            nodes: &*nodes,
            elems: &*elems,
            hgcoef: params.hgcoef,
        };
        corner_forces_chunk(&inputs, 0..num_elem, &mut stress, &mut hourglass)?;

        let node_inputs = NodeInputs {
            nodal_mass: &mesh.nodal_mass,
            symmetry: &mesh.node_symmetry,
            dt,
            u_cut: params.u_cut,
        };
        for mut slab in nodes.slabs_mut(whole(mesh.num_node())) {
            combine_corner_forces(&mesh.adjacency, &stress, &hourglass, slab.start, slab.force);
            integrate_slab(&node_inputs, &mut slab);
        }
        drop(stress);
        drop(hourglass);

        let mut gradients = self.gradient_pool.acquire(num_elem);
        let kinematics = KinematicsInputs {
            mesh,
            nodes: &*nodes,
            params: &params,
            dt,
        };
        for mut slab in elems.kinematics_slabs_mut(whole(num_elem)) {
            kinematics_slab(&kinematics, &mut slab)?;
            gradients_chunk(mesh, &*nodes, slab.start, slab.vnew, &mut gradients[..]);
        }

        let all: Vec<usize> = (0..num_elem).collect();
        let ctx = MaterialContext {
            mesh,
            elems: &*elems,
            gradients: &gradients[..],
            params: &params,
        };
        let updates = material::relax_elements(&ctx, &all, 1)?;
        drop(gradients);
        material::commit(elems, &updates);

        Ok(reduce_all(elems, &params))
    }

    fn name(&self) -> &str {
        "Serial Leapfrog"
    }
}
