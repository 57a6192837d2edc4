//! # hexflow-bench
//!
//! Benchmark suite for the hexflow cycle engine.
//!
//! Provides named Sedov scenarios, a runner that times every cycle,
//! CSV/JSON metric export for regression tracking, and the final run
//! report (origin energy, plane-0 symmetry check, grind time, FOM).

pub mod metrics;
pub mod report;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use report::{FinalReport, SymmetryCheck};
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
