//! # hexflow-telemetry
//!
//! Event bus for solver telemetry. The task-graph engine emits structured
//! events (cycle boundaries, per-phase chunk counts and wall time, run
//! summary) that pluggable sinks consume: `tracing` logs, in-memory
//! collection for tests, or anything implementing [`EventSink`].

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, HydroEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
