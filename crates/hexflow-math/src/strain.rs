//! Velocity gradient and strain rate.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::hex::HexCorners;
use crate::shape::ShapeDerivatives;

/// Symmetric rate-of-deformation tensor of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrainRate {
    pub dxx: f64,
    pub dyy: f64,
    pub dzz: f64,
    pub dyz: f64,
    pub dxz: f64,
    pub dxy: f64,
}

impl StrainRate {
    /// Volumetric strain rate (trace).
    #[inline]
    pub fn trace(&self) -> f64 {
        self.dxx + self.dyy + self.dzz
    }

    /// Removes the volumetric part from the diagonal.
    pub fn deviatoric(mut self) -> Self {
        let third = self.trace() / 3.0;
        self.dxx -= third;
        self.dyy -= third;
        self.dzz -= third;
        self
    }
}

/// Corner pairs across the element diagonal: (0,6), (1,7), (2,4), (3,5).
const OPPOSITE: [usize; 4] = [6, 7, 4, 5];

/// Velocity gradient from nodal velocities and the shape derivatives
/// of the (half-step) geometry.
pub fn velocity_gradient(xd: &HexCorners, shape: &ShapeDerivatives) -> StrainRate {
    let inv_det = 1.0 / shape.determinant;
    let b = &shape.b;

    // row a of L: sum_k b[k].a * (v[k] - v[opp k])
    let mut lx = DVec3::ZERO;
    let mut ly = DVec3::ZERO;
    let mut lz = DVec3::ZERO;
    for (k, &opp) in OPPOSITE.iter().enumerate() {
        let dv = xd[k] - xd[opp];
        lx += b[k].x * dv;
        ly += b[k].y * dv;
        lz += b[k].z * dv;
    }
    lx *= inv_det;
    ly *= inv_det;
    lz *= inv_det;

    StrainRate {
        dxx: lx.x,
        dyy: ly.y,
        dzz: lz.z,
        dyz: 0.5 * (ly.z + lz.y),
        dxz: 0.5 * (lz.x + lx.z),
        dxy: 0.5 * (ly.x + lx.y),
    }
}
