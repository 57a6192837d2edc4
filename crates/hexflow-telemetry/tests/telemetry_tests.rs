//! Integration tests for hexflow-telemetry.

use hexflow_telemetry::bus::EventBus;
use hexflow_telemetry::events::{EventKind, HydroEvent};
use hexflow_telemetry::sinks::{EventSink, TracingSink, VecSink};

fn phase(cycle: u64, name: &str) -> HydroEvent {
    HydroEvent::new(
        cycle,
        EventKind::PhaseComplete {
            phase: name.into(),
            chunks: 4,
            wall_time: 1e-4,
        },
    )
}

// ─── Bus Tests ────────────────────────────────────────────────

#[test]
fn emit_and_flush() {
    let sink = VecSink::new();
    let mut bus = EventBus::new().with_sink(Box::new(sink.shared()));

    bus.emit(HydroEvent::new(0, EventKind::CycleBegin { time: 0.0, dt: 1e-6 }));
    bus.emit(phase(0, "force"));
    assert!(sink.is_empty());

    bus.flush();
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].kind, EventKind::CycleBegin { .. }));
    assert_eq!(events[1], phase(0, "force"));
}

#[test]
fn disabled_bus_drops_events() {
    let sink = VecSink::new();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(sink.shared()));
    bus.set_enabled(false);
    assert!(!bus.is_enabled());
    bus.emit(phase(0, "force"));
    bus.flush();
    assert!(sink.is_empty());
}

#[test]
fn multiple_sinks_see_every_event() {
    let a = VecSink::new();
    let b = VecSink::new();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(a.shared()));
    bus.add_sink(Box::new(b.shared()));
    bus.add_sink(Box::new(TracingSink::new()));
    assert_eq!(bus.sink_count(), 3);

    for cycle in 0..3 {
        bus.emit(phase(cycle, "material"));
    }
    bus.finalize();
    assert_eq!(a.len(), 3);
    assert_eq!(b.events(), a.events());
}

#[test]
fn sink_names() {
    assert_eq!(VecSink::new().name(), "vec_sink");
    assert_eq!(TracingSink::new().name(), "tracing_sink");
}

// ─── Event Tests ──────────────────────────────────────────────

#[test]
fn event_serialization() {
    let event = HydroEvent::new(
        5,
        EventKind::CycleEnd {
            dtcourant: 1e-4,
            dthydro: 2e-3,
            wall_time: 0.01,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: HydroEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn run_complete_event() {
    let event = HydroEvent::new(
        932,
        EventKind::RunComplete {
            cycles: 932,
            elapsed: 12.5,
            origin_energy: 2.025075e5,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("origin_energy"));
}
