//! Material update: monotonic artificial viscosity and the ideal-gas EOS.
//!
//! Each region sub-chunk runs a continuation chain inside the material
//! scope:
//!
//! ```text
//! init (qstop check, monotonic Q, vnewc) ─► EOS × rep ─► sound speed + save
//! ```
//!
//! The chunk's [`EosWorkspace`] moves from stage to stage. Every EOS pass
//! starts from the element state stored at the beginning of the phase, so
//! repeating it changes the cost of a region and nothing else. The final
//! stage sends [`ElemUpdate`]s to the join, where they are committed.

use hexflow_math::DirectionalGradients;
use hexflow_mesh::{ElemState, HexMesh, HydroParams};
use hexflow_types::constants::{PTINY, SSC_FLOOR_THRESHOLD, SSC_FLOOR_VALUE};
use hexflow_types::{ElemId, HydroError, HydroResult};

use crate::scheduler::ChunkSink;

/// Artificial load imbalance between regions.
///
/// The first half of the regions run the EOS once, the next ones
/// `1 + cost` times and the last `(n + 15) / 20` regions `10 * (1 + cost)`
/// times. The extra passes recompute identical values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImbalancePolicy;

impl ImbalancePolicy {
    /// EOS passes for region index `region` of `num_regions`.
    pub fn repetitions(region: usize, num_regions: usize, cost: u32) -> usize {
        let cost = cost as usize;
        if region < num_regions / 2 {
            1
        } else if region < num_regions - (num_regions + 15) / 20 {
            1 + cost
        } else {
            10 * (1 + cost)
        }
    }
}

/// Read-only inputs of the material phase.
#[derive(Clone, Copy)]
pub struct MaterialContext<'a> {
    pub mesh: &'a HexMesh,
    pub elems: &'a ElemState,
    /// Directional gradients of every element.
    pub gradients: &'a [DirectionalGradients],
    pub params: &'a HydroParams,
}

/// New thermodynamic state of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElemUpdate {
    pub elem: usize,
    pub p: f64,
    pub e: f64,
    pub q: f64,
    pub ql: f64,
    pub qq: f64,
    pub ss: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct EosSlot {
    vnewc: f64,
    ql: f64,
    qq: f64,
    p: f64,
    e: f64,
    q: f64,
    bvc: f64,
    pbvc: f64,
}

/// Scratch of one material sub-chunk, one slot per element.
#[derive(Debug, Clone, Default)]
pub struct EosWorkspace {
    slots: Vec<EosSlot>,
}

impl EosWorkspace {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Pressure of the ideal gas at energy `e` and compression `compression`.
///
/// Returns `(p, bvc, pbvc)`.
#[inline]
fn pressure(e: f64, compression: f64, vnewc: f64, params: &HydroParams) -> (f64, f64, f64) {
    const C1S: f64 = 2.0 / 3.0;
    let bvc = C1S * (compression + 1.0);
    let pbvc = C1S;

    let mut p = bvc * e;
    if p.abs() < params.p_cut {
        p = 0.0;
    }
    if params.eosvmax != 0.0 && vnewc >= params.eosvmax {
        p = 0.0;
    }
    if p < params.pmin {
        p = params.pmin;
    }
    (p, bvc, pbvc)
}

/// `sqrt` of a sound-speed radicand, with a floor for tiny values.
#[inline]
fn floored_sqrt(radicand: f64) -> f64 {
    if radicand <= SSC_FLOOR_THRESHOLD {
        SSC_FLOOR_VALUE
    } else {
        radicand.sqrt()
    }
}

#[inline]
fn snap(value: f64, cut: f64) -> f64 {
    if value.abs() < cut {
        0.0
    } else {
        value
    }
}

/// Slope limiter of one logical direction.
fn limited_slope(ctx: &MaterialContext<'_>, elem: usize, axis: usize) -> f64 {
    let params = ctx.params;
    let own = ctx.gradients[elem].delv[axis];
    let bc = ctx.mesh.boundary[elem][axis];
    let norm = 1.0 / (own + PTINY);

    let neighbor = |n: usize| ctx.gradients[n].delv[axis];
    let mut delvm = bc.minus.resolve(own, neighbor) * norm;
    let mut delvp = bc.plus.resolve(own, neighbor) * norm;

    let mut phi = 0.5 * (delvm + delvp);
    delvm *= params.monoq_limiter_mult;
    delvp *= params.monoq_limiter_mult;
    if delvm < phi {
        phi = delvm;
    }
    if delvp < phi {
        phi = delvp;
    }
    phi.clamp(0.0, params.monoq_max_slope)
}

/// Linear and quadratic monotonic viscosity terms `(ql, qq)` of `elem`.
pub fn monotonic_q(ctx: &MaterialContext<'_>, elem: usize) -> (f64, f64) {
    let phi = [
        limited_slope(ctx, elem, 0),
        limited_slope(ctx, elem, 1),
        limited_slope(ctx, elem, 2),
    ];

    // expanding elements get no viscosity
    if ctx.elems.vdov[elem] > 0.0 {
        return (0.0, 0.0);
    }

    let grad = &ctx.gradients[elem];
    let rho = ctx.mesh.elem_mass[elem] / (ctx.mesh.volo[elem] * ctx.elems.vnew[elem]);
    let mut linear = 0.0;
    let mut quadratic = 0.0;
    for axis in 0..3 {
        let delvx = (grad.delv[axis] * grad.delx[axis]).min(0.0);
        linear += delvx * (1.0 - phi[axis]);
        quadratic += delvx * delvx * (1.0 - phi[axis] * phi[axis]);
    }
    (
        -ctx.params.qlc_monoq * rho * linear,
        ctx.params.qqc_monoq * rho * quadratic,
    )
}

/// First stage: `qstop` check, monotonic Q and the clamped relative volume.
pub fn init_workspace(ctx: &MaterialContext<'_>, elems: &[usize]) -> HydroResult<EosWorkspace> {
    let mut slots = Vec::with_capacity(elems.len());
    for &elem in elems {
        let q = ctx.elems.q[elem];
        if q > ctx.params.qstop {
            return Err(HydroError::QStop {
                elem: ElemId::from(elem),
                q,
            });
        }
        let (ql, qq) = monotonic_q(ctx, elem);
        slots.push(EosSlot {
            vnewc: ctx.params.clamp_volume(ctx.elems.vnew[elem]),
            ql,
            qq,
            ..Default::default()
        });
    }
    Ok(EosWorkspace { slots })
}

/// One full EOS evaluation of every element of the chunk.
pub fn eval_eos(ctx: &MaterialContext<'_>, elems: &[usize], workspace: &mut EosWorkspace) {
    for (&elem, slot) in elems.iter().zip(workspace.slots.iter_mut()) {
        eos_element(ctx, elem, slot);
    }
}

fn eos_element(ctx: &MaterialContext<'_>, elem: usize, slot: &mut EosSlot) {
    let params = ctx.params;
    let rho0 = params.refdens;
    let state = ctx.elems;

    let vnewc = slot.vnewc;
    let (ql, qq) = (slot.ql, slot.qq);
    let e_old = state.e[elem];
    let delvc = state.delv[elem];
    let mut p_old = state.p[elem];
    let q_old = state.q[elem];

    let mut compression = 1.0 / vnewc - 1.0;
    let vchalf = vnewc - 0.5 * delvc;
    let mut comp_half_step = 1.0 / vchalf - 1.0;
    let work = 0.0;

    if params.eosvmin != 0.0 && vnewc <= params.eosvmin {
        comp_half_step = compression;
    }
    if params.eosvmax != 0.0 && vnewc >= params.eosvmax {
        p_old = 0.0;
        compression = 0.0;
        comp_half_step = 0.0;
    }

    // predictor: half-step energy and pressure
    let mut e_new = (e_old - 0.5 * delvc * (p_old + q_old) + 0.5 * work).max(params.emin);
    let (p_half_step, bvc_half, pbvc_half) = pressure(e_new, comp_half_step, vnewc, params);

    let vhalf = 1.0 / (1.0 + comp_half_step);
    let q_half = if delvc > 0.0 {
        0.0
    } else {
        let ssc = floored_sqrt((pbvc_half * e_new + vhalf * vhalf * bvc_half * p_half_step) / rho0);
        ssc * ql + qq
    };
    e_new += 0.5 * delvc * (3.0 * (p_old + q_old) - 4.0 * (p_half_step + q_half));

    e_new += 0.5 * work;
    e_new = snap(e_new, params.e_cut).max(params.emin);

    // corrector
    let (p_new, bvc, pbvc) = pressure(e_new, compression, vnewc, params);
    let q_tilde = if delvc > 0.0 {
        0.0
    } else {
        let ssc = floored_sqrt((pbvc * e_new + vnewc * vnewc * bvc * p_new) / rho0);
        ssc * ql + qq
    };
    e_new -= (7.0 * (p_old + q_old) - 8.0 * (p_half_step + q_half) + (p_new + q_tilde)) * delvc
        / 6.0;
    e_new = snap(e_new, params.e_cut).max(params.emin);

    let (p_new, bvc, pbvc) = pressure(e_new, compression, vnewc, params);
    let q_new = if delvc <= 0.0 {
        let ssc = floored_sqrt((pbvc * e_new + vnewc * vnewc * bvc * p_new) / rho0);
        snap(ssc * ql + qq, params.q_cut)
    } else {
        q_half
    };

    slot.p = p_new;
    slot.e = e_new;
    slot.q = q_new;
    slot.bvc = bvc;
    slot.pbvc = pbvc;
}

/// Last stage: sound speed and the element updates to commit.
pub fn finish(
    ctx: &MaterialContext<'_>,
    elems: &[usize],
    workspace: EosWorkspace,
) -> Vec<ElemUpdate> {
    let rho0 = ctx.params.refdens;
    elems
        .iter()
        .zip(workspace.slots)
        .map(|(&elem, slot)| {
            let radicand =
                (slot.pbvc * slot.e + slot.vnewc * slot.vnewc * slot.bvc * slot.p) / rho0;
            ElemUpdate {
                elem,
                p: slot.p,
                e: slot.e,
                q: slot.q,
                ql: slot.ql,
                qq: slot.qq,
                ss: floored_sqrt(radicand),
            }
        })
        .collect()
}

/// Runs the whole chain for `elems` on the calling thread.
pub fn relax_elements(
    ctx: &MaterialContext<'_>,
    elems: &[usize],
    repetitions: usize,
) -> HydroResult<Vec<ElemUpdate>> {
    let mut workspace = init_workspace(ctx, elems)?;
    for _ in 0..repetitions.max(1) {
        eval_eos(ctx, elems, &mut workspace);
    }
    Ok(finish(ctx, elems, workspace))
}

/// Writes material results back into the element state.
pub fn commit(state: &mut ElemState, updates: &[ElemUpdate]) {
    for u in updates {
        state.p[u.elem] = u.p;
        state.e[u.elem] = u.e;
        state.q[u.elem] = u.q;
        state.ql[u.elem] = u.ql;
        state.qq[u.elem] = u.qq;
        state.ss[u.elem] = u.ss;
    }
}

/// Spawns the continuation chain of one sub-chunk into `scope`.
///
/// The result (or the first error) is reported as chunk `chunk`.
pub fn spawn_relaxation<'scope>(
    scope: &rayon::Scope<'scope>,
    ctx: MaterialContext<'scope>,
    chunk: usize,
    elems: &'scope [usize],
    repetitions: usize,
    sink: ChunkSink<Vec<ElemUpdate>>,
) {
    scope.spawn(move |scope| match init_workspace(&ctx, elems) {
        Ok(workspace) => spawn_eos(scope, ctx, chunk, elems, workspace, repetitions.max(1), sink),
        Err(e) => sink.send(chunk, Err(e)),
    });
}

fn spawn_eos<'scope>(
    scope: &rayon::Scope<'scope>,
    ctx: MaterialContext<'scope>,
    chunk: usize,
    elems: &'scope [usize],
    mut workspace: EosWorkspace,
    remaining: usize,
    sink: ChunkSink<Vec<ElemUpdate>>,
) {
    scope.spawn(move |scope| {
        eval_eos(&ctx, elems, &mut workspace);
        if remaining > 1 {
            spawn_eos(scope, ctx, chunk, elems, workspace, remaining - 1, sink);
        } else {
            scope.spawn(move |_| sink.send(chunk, Ok(finish(&ctx, elems, workspace))));
        }
    });
}
