//! Numerical constants and simulation defaults.

// ─── Cutoffs ───

/// Energy values with magnitude below this snap to zero.
pub const E_CUT: f64 = 1.0e-7;

/// Pressure values with magnitude below this snap to zero.
pub const P_CUT: f64 = 1.0e-7;

/// Artificial viscosity values with magnitude below this snap to zero.
pub const Q_CUT: f64 = 1.0e-7;

/// Velocity components with magnitude below this snap to zero.
pub const U_CUT: f64 = 1.0e-7;

/// Relative volumes within this band of 1.0 snap to exactly 1.0.
pub const V_CUT: f64 = 1.0e-10;

// ─── Hourglass / artificial viscosity ───

/// Hourglass control coefficient.
pub const HGCOEF: f64 = 3.0;

/// Artificial viscosity above which a run is aborted.
pub const QSTOP: f64 = 1.0e12;

pub const MONOQ_MAX_SLOPE: f64 = 1.0;
pub const MONOQ_LIMITER_MULT: f64 = 2.0;
pub const QLC_MONOQ: f64 = 0.5;
pub const QQC_MONOQ: f64 = 2.0 / 3.0;
pub const QQC: f64 = 2.0;

/// Guard added to denominators in the monotonic-Q gradients.
pub const PTINY: f64 = 1.0e-36;

// ─── Equation of state ───

pub const EOSVMAX: f64 = 1.0e9;
pub const EOSVMIN: f64 = 1.0e-9;
pub const PMIN: f64 = 0.0;
pub const EMIN: f64 = -1.0e15;
pub const REFDENS: f64 = 1.0;
pub const SS4O3: f64 = 4.0 / 3.0;

/// Sound-speed radicands at or below this value are replaced by [`SSC_FLOOR_VALUE`].
pub const SSC_FLOOR_THRESHOLD: f64 = 0.1111111e-36;

/// Square root substituted for a floored sound-speed radicand.
pub const SSC_FLOOR_VALUE: f64 = 0.3333333e-18;

// ─── Timestep control ───

/// Maximum allowed relative volume change per cycle.
pub const DVOVMAX: f64 = 0.1;

/// Bound reported when no element constrains the timestep.
pub const UNCONSTRAINED_DT: f64 = 1.0e20;

pub const DTFIXED: f64 = -1.0e-6;
pub const STOPTIME: f64 = 1.0e-2;
pub const DTMAX: f64 = 1.0e-2;
pub const DELTATIME_MULT_LB: f64 = 1.1;
pub const DELTATIME_MULT_UB: f64 = 1.2;

// ─── Sedov problem ───

/// Physical edge length of the Sedov cube.
pub const MESH_EXTENT: f64 = 1.125;

/// Energy deposited in the origin element for a 45³ mesh.
pub const SEDOV_EBASE: f64 = 3.948746e7;

/// Mesh size at which [`SEDOV_EBASE`] applies unscaled.
pub const SEDOV_REFERENCE_SIZE: f64 = 45.0;

// ─── Scheduling ───

/// Default chunk size for every phase.
pub const DEFAULT_TASK_SIZE: usize = 1024;
