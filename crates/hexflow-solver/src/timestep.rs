//! Adaptive timestep selection.

use hexflow_mesh::{HydroParams, SimClock};
use hexflow_types::constants::UNCONSTRAINED_DT;

/// Picks the timestep of the next cycle, then advances `time` and
/// `cycle`. Returns the chosen timestep.
///
/// With `dtfixed <= 0`, every cycle after the first derives a new step
/// from the bounds of the previous one (half the Courant bound, two
/// thirds of the hydro bound). Growth below `deltatimemultlb` is
/// ignored, growth is capped at `deltatimemultub` and at `dtmax`. Near
/// `stoptime` the step is shortened so the run does not end on a sliver.
pub fn time_increment(clock: &mut SimClock, params: &HydroParams) -> f64 {
    if params.dtfixed <= 0.0 && clock.cycle != 0 {
        let old_dt = clock.deltatime;

        let mut gnewdt = UNCONSTRAINED_DT;
        if clock.dtcourant < gnewdt {
            gnewdt = clock.dtcourant / 2.0;
        }
        if clock.dthydro < gnewdt {
            gnewdt = clock.dthydro * 2.0 / 3.0;
        }

        let mut new_dt = gnewdt;
        let ratio = new_dt / old_dt;
        if ratio >= 1.0 {
            if ratio < params.deltatimemultlb {
                new_dt = old_dt;
            } else if ratio > params.deltatimemultub {
                new_dt = old_dt * params.deltatimemultub;
            }
        }
        clock.deltatime = new_dt.min(params.dtmax);
    }

    let mut target_dt = params.stoptime - clock.time;
    if target_dt > clock.deltatime && target_dt < 4.0 * clock.deltatime / 3.0 {
        target_dt = 2.0 * clock.deltatime / 3.0;
    }
    if target_dt < clock.deltatime {
        clock.deltatime = target_dt;
    }

    clock.time += clock.deltatime;
    clock.cycle += 1;
    clock.deltatime
}
