//! Run loop.
//!
//! [`Simulation`] alternates [`time_increment`] and
//! [`LagrangeStrategy::advance_cycle`] until the stop time or the cycle
//! cap, feeding each cycle's bounds back into the clock.

use std::path::Path;
use std::time::{Duration, Instant};

use hexflow_mesh::generators::{sedov_cube_with, SedovConfig};
use hexflow_mesh::{HydroParams, MeshState};
use hexflow_telemetry::{EventBus, EventKind, HydroEvent};
use hexflow_types::{HydroError, HydroResult};
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::constraints::ConstraintBounds;
use crate::leapfrog::TaskGraphLeapfrog;
use crate::strategy::LagrangeStrategy;
use crate::timestep::time_increment;

/// Default cycle cap; effectively unbounded.
pub const DEFAULT_MAX_CYCLES: u64 = 9_999_999;

/// Cycles between progress lines at `info` level.
pub const PROGRESS_INTERVAL: u64 = 100;

/// Everything needed to set up a run, loadable from TOML.
///
/// ```toml
/// max_cycles = 100
///
/// [mesh]
/// size = 45
/// num_regions = 11
///
/// [solver]
/// threads = 8
///
/// [solver.task_sizes]
/// nodal = 2048
/// elements = 2048
/// constraints = 8192
///
/// [params]
/// stoptime = 1e-2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub max_cycles: u64,
    pub mesh: SedovConfig,
    pub solver: SolverConfig,
    pub params: HydroParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            mesh: SedovConfig::default(),
            solver: SolverConfig::default(),
            params: HydroParams::default(),
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> HydroResult<Self> {
        let config: RunConfig =
            toml::from_str(text).map_err(|e| HydroError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> HydroResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> HydroResult<String> {
        toml::to_string(self).map_err(|e| HydroError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> HydroResult<()> {
        self.mesh.validate()?;
        self.solver.task_sizes.validate()?;
        self.params.validate()
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub strategy: String,
    pub cycles: u64,
    pub time: f64,
    pub elapsed: Duration,
    /// Energy of the origin element.
    pub origin_energy: f64,
}

/// A mesh state driven by a cycle strategy.
pub struct Simulation {
    pub state: MeshState,
    strategy: Box<dyn LagrangeStrategy>,
    max_cycles: u64,
    progress: bool,
    events: Option<EventBus>,
}

impl Simulation {
    pub fn new(state: MeshState, strategy: Box<dyn LagrangeStrategy>, max_cycles: u64) -> Self {
        Self {
            state,
            strategy,
            max_cycles,
            progress: false,
            events: None,
        }
    }

    /// Builds the Sedov problem and a task-graph strategy from a config.
    pub fn from_config(config: &RunConfig) -> HydroResult<Self> {
        config.validate()?;
        let strategy = TaskGraphLeapfrog::new(config.solver)?;
        let state = sedov_cube_with(&config.mesh, config.params)?;
        Ok(Self::new(state, Box::new(strategy), config.max_cycles))
    }

    /// Logs every [`PROGRESS_INTERVAL`]th cycle at `info` level; the rest
    /// go to `debug`.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Attaches an event bus that receives the run summary.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn num_threads(&self) -> usize {
        self.strategy.num_threads()
    }

    pub fn into_state(self) -> MeshState {
        self.state
    }

    /// Whether the stop time or the cycle cap has been reached.
    pub fn finished(&self) -> bool {
        let clock = &self.state.clock;
        clock.time >= self.state.params.stoptime || clock.cycle >= self.max_cycles
    }

    /// One time increment plus one cycle.
    pub fn step(&mut self) -> HydroResult<ConstraintBounds> {
        let dt = time_increment(&mut self.state.clock, &self.state.params);
        let bounds = self.strategy.advance_cycle(&mut self.state, dt)?;
        self.state.clock.dtcourant = bounds.courant;
        self.state.clock.dthydro = bounds.hydro;
        Ok(bounds)
    }

    /// Runs until [`finished`](Self::finished).
    pub fn run(&mut self) -> HydroResult<RunSummary> {
        let start = Instant::now();
        tracing::info!(
            strategy = self.strategy.name(),
            elements = self.state.num_elem(),
            stoptime = self.state.params.stoptime,
            max_cycles = self.max_cycles,
            "Run started"
        );

        while !self.finished() {
            self.step()?;
            let clock = &self.state.clock;
            if self.progress && clock.cycle % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    cycle = clock.cycle,
                    time = clock.time,
                    dt = clock.deltatime,
                    "Cycle complete"
                );
            } else {
                tracing::debug!(
                    cycle = clock.cycle,
                    time = clock.time,
                    dt = clock.deltatime,
                    "Cycle complete"
                );
            }
        }

        let summary = RunSummary {
            strategy: self.strategy.name().to_string(),
            cycles: self.state.clock.cycle,
            time: self.state.clock.time,
            elapsed: start.elapsed(),
            origin_energy: self.state.elems.e.first().copied().unwrap_or(0.0),
        };
        tracing::info!(
            cycles = summary.cycles,
            time = summary.time,
            elapsed_s = summary.elapsed.as_secs_f64(),
            "Run complete"
        );
        if let Some(bus) = self.events.as_mut() {
            bus.emit(HydroEvent::new(
                summary.cycles,
                EventKind::RunComplete {
                    cycles: summary.cycles,
                    elapsed: summary.elapsed.as_secs_f64(),
                    origin_energy: summary.origin_energy,
                },
            ));
            bus.finalize();
        }
        Ok(summary)
    }
}
