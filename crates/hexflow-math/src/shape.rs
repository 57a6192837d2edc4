//! Shape-function derivatives of the trilinear hexahedron.

use glam::DVec3;

use crate::hex::HexCorners;

/// Derivatives of the eight shape functions with respect to x, y, z,
/// evaluated at the element centre and scaled by the Jacobian.
///
/// `b[i]` holds `(∂N_i/∂x, ∂N_i/∂y, ∂N_i/∂z)`. By symmetry only nodes
/// 0–3 are independent; 4–7 are their negations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDerivatives {
    pub b: HexCorners,
    /// Jacobian determinant (element volume estimate).
    pub determinant: f64,
}

impl ShapeDerivatives {
    /// Computes the derivatives for the given corner positions.
    pub fn compute(x: &HexCorners) -> Self {
        let d60 = x[6] - x[0];
        let d53 = x[5] - x[3];
        let d71 = x[7] - x[1];
        let d42 = x[4] - x[2];

        let fj_xi = 0.125 * (d60 + d53 - d71 - d42);
        let fj_et = 0.125 * (d60 - d53 + d71 - d42);
        let fj_ze = 0.125 * (d60 + d53 + d71 + d42);

        // cofactors
        let cj_xi = fj_et.cross(fj_ze);
        let cj_et = fj_ze.cross(fj_xi);
        let cj_ze = fj_xi.cross(fj_et);

        let b0 = -cj_xi - cj_et - cj_ze;
        let b1 = cj_xi - cj_et - cj_ze;
        let b2 = cj_xi + cj_et - cj_ze;
        let b3 = -cj_xi + cj_et - cj_ze;

        Self {
            b: [b0, b1, b2, b3, -b2, -b3, -b0, -b1],
            determinant: 8.0 * fj_et.dot(cj_et),
        }
    }

    /// Derivative vector of local node `i`.
    #[inline]
    pub fn node(&self, i: usize) -> DVec3 {
        self.b[i]
    }
}
