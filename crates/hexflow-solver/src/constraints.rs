//! Courant and hydro timestep bounds.

use hexflow_mesh::{ElemState, HydroParams};
use hexflow_types::constants::UNCONSTRAINED_DT;
use serde::{Deserialize, Serialize};

/// Timestep bounds reduced over a set of elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintBounds {
    pub courant: f64,
    pub hydro: f64,
}

impl ConstraintBounds {
    /// Identity of [`merge`](Self::merge).
    pub const UNCONSTRAINED: ConstraintBounds = ConstraintBounds {
        courant: UNCONSTRAINED_DT,
        hydro: UNCONSTRAINED_DT,
    };

    /// Component-wise minimum.
    #[inline]
    pub fn merge(self, other: ConstraintBounds) -> ConstraintBounds {
        ConstraintBounds {
            courant: self.courant.min(other.courant),
            hydro: self.hydro.min(other.hydro),
        }
    }
}

impl Default for ConstraintBounds {
    fn default() -> Self {
        Self::UNCONSTRAINED
    }
}

/// Bounds of a single element. A zero `vdov` constrains nothing and
/// yields `f64::MAX` on both sides.
#[inline]
pub fn element_bounds(state: &ElemState, elem: usize, params: &HydroParams) -> ConstraintBounds {
    let vdov = state.vdov[elem];
    if vdov == 0.0 {
        return ConstraintBounds {
            courant: f64::MAX,
            hydro: f64::MAX,
        };
    }

    let qqc2 = 64.0 * params.qqc * params.qqc;
    let arealg = state.arealg[elem];
    let ss = state.ss[elem];
    let mut dtf = ss * ss;
    if vdov < 0.0 {
        dtf += qqc2 * arealg * arealg * vdov * vdov;
    }

    ConstraintBounds {
        courant: arealg / dtf.sqrt(),
        hydro: params.dvovmax / (vdov.abs() + 1.0e-20),
    }
}

/// Reduces the bounds of `elems`, starting from
/// [`ConstraintBounds::UNCONSTRAINED`].
pub fn reduce_bounds(state: &ElemState, elems: &[usize], params: &HydroParams) -> ConstraintBounds {
    elems
        .iter()
        .fold(ConstraintBounds::UNCONSTRAINED, |acc, &elem| {
            acc.merge(element_bounds(state, elem, params))
        })
}

/// Like [`reduce_bounds`] over the contiguous range `0..num_elem`.
pub fn reduce_all(state: &ElemState, params: &HydroParams) -> ConstraintBounds {
    (0..state.len()).fold(ConstraintBounds::UNCONSTRAINED, |acc, elem| {
        acc.merge(element_bounds(state, elem, params))
    })
}
