//! Flanagan–Belytschko hourglass control.
//!
//! The four hourglass modes of a hexahedron are projected out of the
//! nodal velocity field using the element's volume derivatives, and the
//! resulting mode amplitudes are fed back as a damping force.

use glam::DVec3;

use crate::hex::HexCorners;

/// Hourglass base vectors γ, one row per mode.
pub const GAMMA: [[f64; 8]; 4] = [
    [1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0],
    [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0],
];

/// Hourglass shape vectors `hourgam[node][mode]`, corrected so they are
/// orthogonal to the linear velocity field.
pub type HourglassBasis = [[f64; 4]; 8];

/// Builds the corrected hourglass basis.
///
/// `determinant` is the element volume `volo * v`; the caller checks it
/// is positive.
pub fn hourglass_basis(x: &HexCorners, dvd: &HexCorners, determinant: f64) -> HourglassBasis {
    let volinv = 1.0 / determinant;
    let mut hourgam = [[0.0; 4]; 8];
    for (mode, gamma) in GAMMA.iter().enumerate() {
        let hourmod = x
            .iter()
            .zip(gamma.iter())
            .fold(DVec3::ZERO, |acc, (xi, g)| acc + *xi * *g);
        for node in 0..8 {
            hourgam[node][mode] = gamma[node] - volinv * dvd[node].dot(hourmod);
        }
    }
    hourgam
}

/// Hourglass coefficient `-hgcoef * 0.01 * ss * mass / cbrt(volume)`.
#[inline]
pub fn hourglass_coefficient(hgcoef: f64, sound_speed: f64, mass: f64, determinant: f64) -> f64 {
    -hgcoef * 0.01 * sound_speed * mass / determinant.cbrt()
}

/// Anti-hourglass forces at the eight corners for nodal velocities `xd`.
pub fn fb_hourglass_force(xd: &HexCorners, hourgam: &HourglassBasis, coefficient: f64) -> HexCorners {
    let mut amplitude = [DVec3::ZERO; 4];
    for (mode, amp) in amplitude.iter_mut().enumerate() {
        *amp = (0..8).fold(DVec3::ZERO, |acc, node| acc + hourgam[node][mode] * xd[node]);
    }

    let mut forces = [DVec3::ZERO; 8];
    for (node, force) in forces.iter_mut().enumerate() {
        let h = &hourgam[node];
        *force = coefficient
            * (h[0] * amplitude[0] + h[1] * amplitude[1] + h[2] * amplitude[2] + h[3] * amplitude[3]);
    }
    forces
}
