//! Benchmark scenarios — Sedov problem setup + solver config per test case.
//!
//! Three canonical scenarios for regression testing:
//! 1. **Smoke** — A 6³ cube with a handful of regions, a few cycles
//! 2. **Standard** — The default 30³ problem with 11 regions
//! 3. **Imbalanced** — Steep region weights and expensive regions, which
//!    stresses the material phase's repetition policy

use serde::{Deserialize, Serialize};

use hexflow_mesh::generators::{sedov_cube_with, SedovConfig};
use hexflow_mesh::{HydroParams, MeshState};
use hexflow_solver::{SolverConfig, TaskGraphLeapfrog, TaskSizes};
use hexflow_types::HydroResult;

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Small cube, short run.
    Smoke,
    /// Default problem size and region count.
    Standard,
    /// Unbalanced regions with high extra cost.
    Imbalanced,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::Smoke,
            ScenarioKind::Standard,
            ScenarioKind::Imbalanced,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Smoke => "smoke",
            ScenarioKind::Standard => "standard",
            ScenarioKind::Imbalanced => "imbalanced",
        }
    }

    /// Looks a scenario up by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.name() == name)
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Scenario type.
    pub kind: ScenarioKind,
    /// Sedov mesh setup.
    pub mesh: SedovConfig,
    pub params: HydroParams,
    /// Chunk sizes and worker threads.
    pub solver: SolverConfig,
    /// Cycle cap. The run also ends at `params.stoptime`.
    pub max_cycles: u64,
}

impl Scenario {
    /// A 6³ cube split into 4 regions, 20 cycles with small chunks so every
    /// phase fans out into several tasks.
    pub fn smoke() -> Self {
        let mesh = SedovConfig {
            size: 6,
            num_regions: 4,
            ..Default::default()
        };
        Self {
            kind: ScenarioKind::Smoke,
            mesh,
            params: HydroParams::default(),
            solver: SolverConfig {
                threads: 0,
                task_sizes: TaskSizes::uniform(32),
            },
            max_cycles: 20,
        }
    }

    /// The default 30³ problem, 11 regions, 100 cycles.
    pub fn standard() -> Self {
        let mesh = SedovConfig::default();
        Self {
            kind: ScenarioKind::Standard,
            mesh,
            params: HydroParams::default(),
            solver: SolverConfig::for_problem_size(mesh.size),
            max_cycles: 100,
        }
    }

    /// A 20³ cube whose 11 regions are weighted `(i + 1)^4`, with cost 3
    /// for the expensive ones. 100 cycles.
    pub fn imbalanced() -> Self {
        let mesh = SedovConfig {
            size: 20,
            num_regions: 11,
            balance: 4,
            cost: 3,
            ..Default::default()
        };
        Self {
            kind: ScenarioKind::Imbalanced,
            mesh,
            params: HydroParams::default(),
            solver: SolverConfig::for_problem_size(mesh.size),
            max_cycles: 100,
        }
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Smoke => Self::smoke(),
            ScenarioKind::Standard => Self::standard(),
            ScenarioKind::Imbalanced => Self::imbalanced(),
        }
    }

    /// Overrides the cycle cap.
    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Overrides the worker thread count (0 = all cores).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.solver.threads = threads;
        self
    }

    /// Builds the initial mesh state.
    pub fn build_state(&self) -> HydroResult<MeshState> {
        sedov_cube_with(&self.mesh, self.params)
    }

    /// Builds the task-graph strategy for this scenario's solver config.
    pub fn build_strategy(&self) -> HydroResult<TaskGraphLeapfrog> {
        TaskGraphLeapfrog::new(self.solver)
    }
}
