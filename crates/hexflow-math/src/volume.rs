//! Element volume, face area and volume derivatives.

use glam::DVec3;

use crate::hex::HexCorners;

/// Exact volume of a trilinear hexahedron.
pub fn elem_volume(x: &HexCorners) -> f64 {
    let d61 = x[6] - x[1];
    let d70 = x[7] - x[0];
    let d63 = x[6] - x[3];
    let d20 = x[2] - x[0];
    let d50 = x[5] - x[0];
    let d64 = x[6] - x[4];
    let d31 = x[3] - x[1];
    let d72 = x[7] - x[2];
    let d43 = x[4] - x[3];
    let d57 = x[5] - x[7];
    let d14 = x[1] - x[4];
    let d25 = x[2] - x[5];

    let volume = triple_product(d31 + d72, d63, d20)
        + triple_product(d43 + d57, d64, d70)
        + triple_product(d14 + d25, d61, d50);

    volume / 12.0
}

#[inline]
fn triple_product(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    a.dot(b.cross(c))
}

/// Squared-area measure of the quadrilateral face `x0 x1 x2 x3`
/// (`|f|²|g|² − (f·g)²` of its two diagonals' sum and difference).
pub fn area_face(x0: DVec3, x1: DVec3, x2: DVec3, x3: DVec3) -> f64 {
    let f = (x2 - x0) - (x3 - x1);
    let g = (x2 - x0) + (x3 - x1);
    let fg = f.dot(g);
    f.length_squared() * g.length_squared() - fg * fg
}

const FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

/// Characteristic length: `4 · volume / sqrt(largest face area measure)`.
pub fn characteristic_length(x: &HexCorners, volume: f64) -> f64 {
    let largest = FACES.iter().fold(0.0_f64, |acc, f| {
        acc.max(area_face(x[f[0]], x[f[1]], x[f[2]], x[f[3]]))
    });
    4.0 * volume / largest.sqrt()
}

/// Volume derivative with respect to one node, from the six
/// neighbouring corners in the permuted order used below.
fn volu_der(p: [DVec3; 6]) -> DVec3 {
    let [p0, p1, p2, p3, p4, p5] = p;
    let dvdx = (p1.y + p2.y) * (p0.z + p1.z) - (p0.y + p1.y) * (p1.z + p2.z)
        + (p0.y + p4.y) * (p3.z + p4.z)
        - (p3.y + p4.y) * (p0.z + p4.z)
        - (p2.y + p5.y) * (p3.z + p5.z)
        + (p3.y + p5.y) * (p2.z + p5.z);
    let dvdy = -(p1.x + p2.x) * (p0.z + p1.z) + (p0.x + p1.x) * (p1.z + p2.z)
        - (p0.x + p4.x) * (p3.z + p4.z)
        + (p3.x + p4.x) * (p0.z + p4.z)
        + (p2.x + p5.x) * (p3.z + p5.z)
        - (p3.x + p5.x) * (p2.z + p5.z);
    let dvdz = -(p1.y + p2.y) * (p0.x + p1.x) + (p0.y + p1.y) * (p1.x + p2.x)
        - (p0.y + p4.y) * (p3.x + p4.x)
        + (p3.y + p4.y) * (p0.x + p4.x)
        + (p2.y + p5.y) * (p3.x + p5.x)
        - (p3.y + p5.y) * (p2.x + p5.x);

    DVec3::new(dvdx, dvdy, dvdz) / 12.0
}

/// Neighbour permutation feeding `volu_der` for each local node.
const VOLU_DER_ORDER: [[usize; 6]; 8] = [
    [1, 2, 3, 4, 5, 7],
    [2, 3, 0, 5, 6, 4],
    [3, 0, 1, 6, 7, 5],
    [0, 1, 2, 7, 4, 6],
    [7, 6, 5, 0, 3, 1],
    [4, 7, 6, 1, 0, 2],
    [5, 4, 7, 2, 1, 3],
    [6, 5, 4, 3, 2, 0],
];

/// Partial derivatives of the element volume with respect to each
/// corner position.
pub fn volume_derivative(x: &HexCorners) -> HexCorners {
    let mut dvd = [DVec3::ZERO; 8];
    for (node, order) in VOLU_DER_ORDER.iter().enumerate() {
        dvd[node] = volu_der(order.map(|i| x[i]));
    }
    dvd
}
