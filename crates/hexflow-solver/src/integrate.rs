//! Node integrator: acceleration, symmetry planes, velocity, position.

use glam::DVec3;
use hexflow_mesh::{NodeSlab, SymmetryMask};

/// Read-only per-node data of the integrate phase.
#[derive(Clone, Copy)]
pub struct NodeInputs<'a> {
    pub nodal_mass: &'a [f64],
    pub symmetry: &'a [SymmetryMask],
    pub dt: f64,
    pub u_cut: f64,
}

/// Advances the nodes of one slab by `dt`. `slab.force` must already hold
/// the combined nodal forces.
///
/// Acceleration components normal to a node's symmetry planes are zeroed
/// before the velocity update; velocity components below `u_cut` in
/// magnitude snap to zero.
pub fn integrate_slab(inputs: &NodeInputs<'_>, slab: &mut NodeSlab<'_>) {
    let NodeInputs {
        nodal_mass,
        symmetry,
        dt,
        u_cut,
    } = *inputs;

    for i in 0..slab.len() {
        let node = slab.start + i;
        let acc = symmetry[node].apply(slab.force[i] / nodal_mass[node]);
        slab.acc[i] = acc;

        let vel = snap_velocity(slab.vel[i] + acc * dt, u_cut);
        slab.vel[i] = vel;
        slab.pos[i] += vel * dt;
    }
}

#[inline]
fn snap_velocity(v: DVec3, u_cut: f64) -> DVec3 {
    let snap = |c: f64| if c.abs() < u_cut { 0.0 } else { c };
    DVec3::new(snap(v.x), snap(v.y), snap(v.z))
}
