//! # hexflow-solver
//!
//! One explicit Lagrangian hydro cycle, executed as a graph of chunk tasks.
//!
//! Each cycle runs five phases separated by joins:
//!
//! ```text
//! force ──► integrate ──► kinematics ─┬─► material (init ─► rep × EOS ─► save) ──► constraints
//!  (stress + hourglass    (combine,     └─ gradients      per region sub-chunk       per region
//!   per element chunk)     a, v, x)        continuation                              chunk, min-reduce
//! ```
//!
//! Chunk sizes only change how work is split. The physical result of a
//! cycle is the same bit for bit for any [`TaskSizes`].
//!
//! ## Key Types
//!
//! - [`LagrangeStrategy`] — "advance one cycle" trait
//! - [`TaskGraphLeapfrog`] — Rayon task-graph implementation
//! - [`SerialLeapfrog`] — Single-threaded reference over whole ranges
//! - [`SolverConfig`] / [`TaskSizes`] — Chunk granularity and thread count
//! - [`Simulation`] — Run loop with the adaptive timestep driver

pub mod config;
pub mod constraints;
pub mod driver;
pub mod force;
pub mod integrate;
pub mod kinematics;
pub mod leapfrog;
pub mod material;
pub mod partition;
pub mod pool;
pub mod scheduler;
pub mod serial;
pub mod strategy;
pub mod timestep;

pub use config::{SolverConfig, TaskSizes};
pub use constraints::ConstraintBounds;
pub use driver::{RunConfig, RunSummary, Simulation};
pub use leapfrog::TaskGraphLeapfrog;
pub use material::ImbalancePolicy;
pub use partition::ChunkPlan;
pub use scheduler::{CycleStats, Phase, PhaseStats, TaskScheduler};
pub use serial::SerialLeapfrog;
pub use strategy::LagrangeStrategy;
