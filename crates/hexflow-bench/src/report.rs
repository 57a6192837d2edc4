//! Final run report.
//!
//! The Sedov problem is symmetric under swapping the x and y axes, so on
//! the `z = 0` plane the energy of element `(j, k)` must match element
//! `(k, j)`. The report measures that deviation next to the origin energy
//! and the throughput figures.

use std::fmt;
use std::time::Duration;

use hexflow_mesh::MeshState;
use serde::{Deserialize, Serialize};

/// Energies at or below this magnitude do not contribute a relative
/// difference.
const REL_DIFF_FLOOR: f64 = 1e-8;

/// Plane-0 energy symmetry deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SymmetryCheck {
    pub max_abs_diff: f64,
    pub total_abs_diff: f64,
    pub max_rel_diff: f64,
}

impl SymmetryCheck {
    /// Compares `e[j·nx + k]` with `e[k·nx + j]` for every `j < k < nx`.
    ///
    /// The relative difference divides by the mirrored energy, sign
    /// included, and is zero where that energy is within
    /// `1e-8` of zero.
    pub fn from_energy(e: &[f64], nx: usize) -> Self {
        let mut check = Self::default();
        for j in 0..nx {
            for k in (j + 1)..nx {
                let mirrored = e[k * nx + j];
                let abs_diff = (e[j * nx + k] - mirrored).abs();
                check.total_abs_diff += abs_diff;
                check.max_abs_diff = check.max_abs_diff.max(abs_diff);

                let rel_diff = if mirrored.abs() > REL_DIFF_FLOOR {
                    abs_diff / mirrored
                } else {
                    0.0
                };
                check.max_rel_diff = check.max_rel_diff.max(rel_diff);
            }
        }
        check
    }
}

/// Summary printed at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    /// Elements along one edge.
    pub size: usize,
    pub regions: usize,
    pub cycles: u64,
    pub threads: usize,
    /// Wall time of the run loop in seconds.
    pub elapsed: f64,
    /// Energy of element 0.
    pub origin_energy: f64,
    pub symmetry: SymmetryCheck,
    /// Microseconds per zone per cycle.
    pub grind_time: f64,
    /// Figure of merit, `1000 / grind_time`.
    pub fom: f64,
}

impl FinalReport {
    /// Builds the report from the final state and the run wall time.
    /// `threads` defaults to 1; see [`with_threads`](Self::with_threads).
    ///
    /// A run of zero cycles reports zero grind time and FOM.
    pub fn from_state(state: &MeshState, elapsed: Duration) -> Self {
        let size = state.mesh.edge_elems;
        let cycles = state.clock.cycle;
        let elapsed = elapsed.as_secs_f64();

        let zones = (size as f64).powi(3);
        let (grind_time, fom) = if cycles == 0 || size == 0 {
            (0.0, 0.0)
        } else {
            let grind = elapsed * 1e6 / cycles as f64 / zones;
            (grind, if grind > 0.0 { 1000.0 / grind } else { 0.0 })
        };

        Self {
            size,
            regions: state.mesh.num_regions(),
            cycles,
            threads: 1,
            elapsed,
            origin_energy: state.elems.e.first().copied().unwrap_or(0.0),
            symmetry: SymmetryCheck::from_energy(&state.elems.e, size),
            grind_time,
            fom,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Header for [`to_csv_row`](Self::to_csv_row).
    pub fn to_csv_header() -> String {
        "size,regions,cycles,threads,runtime,energy".to_string()
    }

    /// One-line summary for scripted sweeps.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:>12}",
            self.size,
            self.regions,
            self.cycles,
            self.threads,
            self.elapsed,
            scientific(self.origin_energy),
        )
    }
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run completed:")?;
        writeln!(f, "   Problem size        =  {}", self.size)?;
        writeln!(f, "   Iteration count     =  {}", self.cycles)?;
        writeln!(f, "   Final Origin Energy =  {:>12}", scientific(self.origin_energy))?;
        writeln!(f, "   Testing Plane 0 of Energy Array:")?;
        writeln!(f, "        MaxAbsDiff   = {:>12}", scientific(self.symmetry.max_abs_diff))?;
        writeln!(f, "        TotalAbsDiff = {:>12}", scientific(self.symmetry.total_abs_diff))?;
        writeln!(f, "        MaxRelDiff   = {:>12}", scientific(self.symmetry.max_rel_diff))?;
        writeln!(f)?;
        writeln!(f, "Elapsed time         = {:>10.2} (s)", self.elapsed)?;
        writeln!(
            f,
            "Grind time (us/z/c)  = {:>10.8} (per dom)  ({:>10.8} overall)",
            self.grind_time, self.elapsed
        )?;
        write!(f, "FOM                  = {:>10.8} (z/s)", self.fom)
    }
}

/// `1.234560e+05` style: six fraction digits, signed two-digit exponent.
fn scientific(value: f64) -> String {
    let text = format!("{value:.6e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

