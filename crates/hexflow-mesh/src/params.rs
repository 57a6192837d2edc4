//! Scalar simulation parameters.

use hexflow_types::constants;
use hexflow_types::{HydroError, HydroResult};
use serde::{Deserialize, Serialize};

/// Cutoffs, artificial-viscosity constants, EOS bounds and timestep
/// controls. Loaded from TOML with every field optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydroParams {
    // --- Cutoffs ---
    pub e_cut: f64,
    pub p_cut: f64,
    pub q_cut: f64,
    pub u_cut: f64,
    pub v_cut: f64,

    // --- Hourglass / artificial viscosity ---
    pub hgcoef: f64,
    pub ss4o3: f64,
    pub qstop: f64,
    pub monoq_max_slope: f64,
    pub monoq_limiter_mult: f64,
    pub qlc_monoq: f64,
    pub qqc_monoq: f64,
    pub qqc: f64,

    // --- Equation of state ---
    pub eosvmax: f64,
    pub eosvmin: f64,
    pub pmin: f64,
    pub emin: f64,
    pub refdens: f64,

    // --- Timestep control ---
    pub dvovmax: f64,
    /// Fixed timestep when positive; adaptive otherwise.
    pub dtfixed: f64,
    pub stoptime: f64,
    pub dtmax: f64,
    pub deltatimemultlb: f64,
    pub deltatimemultub: f64,
}

impl Default for HydroParams {
    fn default() -> Self {
        Self {
            e_cut: constants::E_CUT,
            p_cut: constants::P_CUT,
            q_cut: constants::Q_CUT,
            u_cut: constants::U_CUT,
            v_cut: constants::V_CUT,
            hgcoef: constants::HGCOEF,
            ss4o3: constants::SS4O3,
            qstop: constants::QSTOP,
            monoq_max_slope: constants::MONOQ_MAX_SLOPE,
            monoq_limiter_mult: constants::MONOQ_LIMITER_MULT,
            qlc_monoq: constants::QLC_MONOQ,
            qqc_monoq: constants::QQC_MONOQ,
            qqc: constants::QQC,
            eosvmax: constants::EOSVMAX,
            eosvmin: constants::EOSVMIN,
            pmin: constants::PMIN,
            emin: constants::EMIN,
            refdens: constants::REFDENS,
            dvovmax: constants::DVOVMAX,
            dtfixed: constants::DTFIXED,
            stoptime: constants::STOPTIME,
            dtmax: constants::DTMAX,
            deltatimemultlb: constants::DELTATIME_MULT_LB,
            deltatimemultub: constants::DELTATIME_MULT_UB,
        }
    }
}

impl HydroParams {
    /// Clamps a relative volume into `[eosvmin, eosvmax]`. A bound of zero
    /// disables that side.
    #[inline]
    pub fn clamp_volume(&self, v: f64) -> f64 {
        let mut v = v;
        if self.eosvmin != 0.0 && v < self.eosvmin {
            v = self.eosvmin;
        }
        if self.eosvmax != 0.0 && v > self.eosvmax {
            v = self.eosvmax;
        }
        v
    }

    /// Rejects parameter sets the kernels cannot run with.
    pub fn validate(&self) -> HydroResult<()> {
        if self.refdens <= 0.0 {
            return Err(HydroError::InvalidConfig(format!(
                "refdens must be positive, got {}",
                self.refdens
            )));
        }
        if self.eosvmin < 0.0 || self.eosvmax < 0.0 {
            return Err(HydroError::InvalidConfig(
                "EOS volume bounds must be non-negative".into(),
            ));
        }
        if self.eosvmin != 0.0 && self.eosvmax != 0.0 && self.eosvmin >= self.eosvmax {
            return Err(HydroError::InvalidConfig(format!(
                "eosvmin ({}) must be below eosvmax ({})",
                self.eosvmin, self.eosvmax
            )));
        }
        if self.stoptime <= 0.0 || self.dtmax <= 0.0 {
            return Err(HydroError::InvalidConfig(
                "stoptime and dtmax must be positive".into(),
            ));
        }
        if self.deltatimemultlb < 1.0 || self.deltatimemultub < self.deltatimemultlb {
            return Err(HydroError::InvalidConfig(format!(
                "Timestep growth window [{}, {}] is invalid",
                self.deltatimemultlb, self.deltatimemultub
            )));
        }
        Ok(())
    }
}
