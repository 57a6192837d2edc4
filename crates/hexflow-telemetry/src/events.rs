//! Solver event types.
//!
//! Structured events emitted by the cycle engine. Events are lightweight
//! value types that carry just enough data to monitor scheduling and
//! timestep behaviour.

use serde::{Deserialize, Serialize};

/// An event emitted by the engine, tagged with the cycle it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydroEvent {
    /// Cycle number (0-indexed, before the increment of this cycle).
    pub cycle: u64,
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Cycle started.
    CycleBegin {
        /// Simulation time at the start of the cycle.
        time: f64,
        /// Timestep used for this cycle.
        dt: f64,
    },

    /// All chunks of one phase joined.
    PhaseComplete {
        /// Phase label (`force`, `integrate`, `kinematics`, `material`, `constraints`).
        phase: String,
        /// Number of chunk results joined.
        chunks: usize,
        /// Wall-clock time of the phase (seconds).
        wall_time: f64,
    },

    /// Cycle completed with the reduced timestep bounds.
    CycleEnd {
        dtcourant: f64,
        dthydro: f64,
        /// Wall-clock time for the entire cycle (seconds).
        wall_time: f64,
    },

    /// A fatal error stopped the cycle.
    CycleAborted {
        /// Rendered error message.
        error: String,
    },

    /// Run finished.
    RunComplete {
        cycles: u64,
        /// Wall-clock time of the whole run (seconds).
        elapsed: f64,
        /// Final energy of the origin element.
        origin_energy: f64,
    },
}

impl HydroEvent {
    pub fn new(cycle: u64, kind: EventKind) -> Self {
        Self { cycle, kind }
    }
}
