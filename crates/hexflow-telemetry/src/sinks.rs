//! Pluggable event sinks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::events::{EventKind, HydroEvent};

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &HydroEvent);

    /// Called when the run ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory. Cloned handles share the same buffer, so
/// the events stay inspectable after the sink is boxed into a bus.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<HydroEvent>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Another handle on the same buffer.
    pub fn shared(&self) -> VecSink {
        self.clone()
    }

    /// Snapshot of the collected events.
    pub fn events(&self) -> Vec<HydroEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &HydroEvent) {
        self.events.lock().push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate. Phase timings go
/// to `debug`, cycle and run summaries to `info`, aborts to `warn`.
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &HydroEvent) {
        match &event.kind {
            EventKind::PhaseComplete {
                phase,
                chunks,
                wall_time,
            } => tracing::debug!(cycle = event.cycle, phase = %phase, chunks, wall_time, "phase_complete"),
            EventKind::CycleAborted { error } => {
                tracing::warn!(cycle = event.cycle, error = %error, "cycle_aborted")
            }
            kind => tracing::info!(cycle = event.cycle, event = ?kind, "hydro_event"),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
