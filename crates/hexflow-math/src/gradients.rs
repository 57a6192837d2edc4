//! Directional derivatives for the monotonic artificial viscosity.
//!
//! For each logical direction (ξ, η, ζ) the element gets a length scale
//! `delx` and a normalised velocity difference `delv` across it.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::hex::HexCorners;

/// Guard against division by zero in degenerate elements.
const PTINY: f64 = 1.0e-36;

/// Per-element `delx`/`delv` triples, indexed ξ = 0, η = 1, ζ = 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionalGradients {
    pub delx: [f64; 3],
    pub delv: [f64; 3],
}

#[inline]
fn face_sum(v: &HexCorners, a: usize, b: usize, c: usize, d: usize) -> DVec3 {
    v[a] + v[b] + v[c] + v[d]
}

/// Half-difference between the two opposite faces along each direction.
#[inline]
fn directions(v: &HexCorners) -> [DVec3; 3] {
    let di = 0.25 * (face_sum(v, 1, 2, 6, 5) - face_sum(v, 0, 3, 7, 4));
    let dj = -0.25 * (face_sum(v, 0, 1, 5, 4) - face_sum(v, 3, 2, 6, 7));
    let dk = 0.25 * (face_sum(v, 4, 5, 6, 7) - face_sum(v, 0, 1, 2, 3));
    [di, dj, dk]
}

/// Computes the directional gradients of an element with corner
/// positions `x`, velocities `xd` and current volume `volume`
/// (`volo * vnew`).
pub fn directional_gradients(x: &HexCorners, xd: &HexCorners, volume: f64) -> DirectionalGradients {
    let norm = 1.0 / (volume + PTINY);
    let [di, dj, dk] = directions(x);
    let [dvi, dvj, dvk] = directions(xd);

    // ξ uses j×k, η uses k×i, ζ uses i×j
    let areas = [dj.cross(dk), dk.cross(di), di.cross(dj)];
    let dvs = [dvi, dvj, dvk];

    let mut out = DirectionalGradients::default();
    for axis in 0..3 {
        let a = areas[axis];
        out.delx[axis] = volume / (a.length_squared() + PTINY).sqrt();
        out.delv[axis] = (a * norm).dot(dvs[axis]);
    }
    out
}
