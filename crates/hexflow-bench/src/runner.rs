//! Benchmark runner — executes scenarios with a strategy and collects metrics.

use std::time::Instant;

use hexflow_mesh::MeshState;
use hexflow_solver::timestep::time_increment;
use hexflow_solver::LagrangeStrategy;
use hexflow_types::HydroResult;

use crate::metrics::BenchmarkMetrics;
use crate::report::FinalReport;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario with the given strategy.
    ///
    /// Returns metrics for the completed run.
    pub fn run(
        scenario: &Scenario,
        strategy: &mut dyn LagrangeStrategy,
    ) -> HydroResult<BenchmarkMetrics> {
        let (metrics, _) = Self::run_with_state(scenario, strategy)?;
        Ok(metrics)
    }

    /// Like [`run`](Self::run), but also hands back the final mesh state.
    pub fn run_with_state(
        scenario: &Scenario,
        strategy: &mut dyn LagrangeStrategy,
    ) -> HydroResult<(BenchmarkMetrics, MeshState)> {
        let mut state = scenario.build_state()?;
        tracing::info!(
            scenario = scenario.kind.name(),
            strategy = strategy.name(),
            elements = state.num_elem(),
            max_cycles = scenario.max_cycles,
            "Benchmark started"
        );

        let mut cycle_times: Vec<f64> = Vec::new();
        let total_start = Instant::now();

        while state.clock.time < state.params.stoptime && state.clock.cycle < scenario.max_cycles {
            let cycle_start = Instant::now();
            let dt = time_increment(&mut state.clock, &state.params);
            let bounds = strategy.advance_cycle(&mut state, dt)?;
            state.clock.dtcourant = bounds.courant;
            state.clock.dthydro = bounds.hydro;
            cycle_times.push(cycle_start.elapsed().as_secs_f64());
        }

        let total_wall_time = total_start.elapsed();
        let report = FinalReport::from_state(&state, total_wall_time)
            .with_threads(strategy.num_threads());

        let avg_cycle = if cycle_times.is_empty() {
            0.0
        } else {
            cycle_times.iter().sum::<f64>() / cycle_times.len() as f64
        };
        let min_cycle = cycle_times.iter().copied().fold(f64::MAX, f64::min);
        let max_cycle = cycle_times.iter().copied().fold(0.0, f64::max);

        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            strategy: strategy.name().to_string(),
            size: report.size,
            regions: report.regions,
            threads: report.threads,
            cycles: report.cycles,
            total_wall_time: total_wall_time.as_secs_f64(),
            avg_cycle_time: avg_cycle,
            min_cycle_time: if cycle_times.is_empty() { 0.0 } else { min_cycle },
            max_cycle_time: max_cycle,
            final_time: state.clock.time,
            origin_energy: report.origin_energy,
            max_rel_diff: report.symmetry.max_rel_diff,
            grind_time: report.grind_time,
            fom: report.fom,
        };
        tracing::info!(
            scenario = %metrics.scenario,
            cycles = metrics.cycles,
            wall_time_s = metrics.total_wall_time,
            grind_us = metrics.grind_time,
            "Benchmark complete"
        );
        Ok((metrics, state))
    }

    /// Run a scenario on its own task-graph strategy.
    pub fn run_scenario(scenario: &Scenario) -> HydroResult<BenchmarkMetrics> {
        let mut strategy = scenario.build_strategy()?;
        Self::run(scenario, &mut strategy)
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all() -> HydroResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run_scenario(&Scenario::from_kind(kind)))
            .collect()
    }
}
