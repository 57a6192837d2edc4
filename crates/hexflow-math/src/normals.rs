//! Face-area node normals and the stress integral.

use glam::DVec3;

use crate::hex::HexCorners;

/// Faces of the hexahedron, each listed so its area vector points outward.
const FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [0, 4, 5, 1],
    [1, 5, 6, 2],
    [2, 6, 7, 3],
    [3, 7, 4, 0],
    [4, 7, 6, 5],
];

/// Quarter of the area vector of the quadrilateral `x0 x1 x2 x3`, from
/// the cross product of its two bisectors.
#[inline]
fn face_area_quarter(x0: DVec3, x1: DVec3, x2: DVec3, x3: DVec3) -> DVec3 {
    let bisect0 = 0.5 * (x3 + x2 - x1 - x0);
    let bisect1 = 0.5 * (x2 + x1 - x3 - x0);
    0.25 * bisect0.cross(bisect1)
}

/// Area-weighted normals at the eight corners. Each face adds a quarter
/// of its area vector to each of its four corners.
pub fn elem_node_normals(x: &HexCorners) -> HexCorners {
    let mut normals = [DVec3::ZERO; 8];
    for face in &FACES {
        let area = face_area_quarter(x[face[0]], x[face[1]], x[face[2]], x[face[3]]);
        for &corner in face {
            normals[corner] += area;
        }
    }
    normals
}

/// Nodal forces of a diagonal stress `sigma` (same on every axis):
/// `f_i = -sigma * n_i`.
pub fn stress_to_node_forces(normals: &HexCorners, sigma: f64) -> HexCorners {
    normals.map(|n| -(sigma * n))
}
