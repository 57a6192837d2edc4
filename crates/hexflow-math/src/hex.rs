//! Corner gathering.

use glam::DVec3;

/// One vector per local corner of a hexahedron.
pub type HexCorners = [DVec3; 8];

/// Copies the eight corner values of an element out of a node-indexed array.
#[inline]
pub fn gather(src: &[DVec3], nodes: &[usize; 8]) -> HexCorners {
    [
        src[nodes[0]],
        src[nodes[1]],
        src[nodes[2]],
        src[nodes[3]],
        src[nodes[4]],
        src[nodes[5]],
        src[nodes[6]],
        src[nodes[7]],
    ]
}

/// Returns `a - s * b` corner-wise. Used for half-step positions.
#[inline]
pub fn sub_scaled(a: &HexCorners, b: &HexCorners, s: f64) -> HexCorners {
    let mut out = *a;
    for (o, v) in out.iter_mut().zip(b.iter()) {
        *o -= s * *v;
    }
    out
}
