//! Benchmark metrics — data collected during a benchmark run.

use hexflow_types::{HydroError, HydroResult};
use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Strategy name.
    pub strategy: String,
    /// Elements along one edge.
    pub size: usize,
    pub regions: usize,
    pub threads: usize,
    /// Number of cycles executed.
    pub cycles: u64,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time per cycle (seconds).
    pub avg_cycle_time: f64,
    /// Minimum cycle time.
    pub min_cycle_time: f64,
    /// Maximum cycle time.
    pub max_cycle_time: f64,
    /// Simulated time reached.
    pub final_time: f64,
    /// Energy of element 0 at the end of the run.
    pub origin_energy: f64,
    /// Plane-0 symmetry deviation (should stay near round-off).
    pub max_rel_diff: f64,
    /// Microseconds per zone per cycle.
    pub grind_time: f64,
    pub fom: f64,
}

impl BenchmarkMetrics {
    /// Format as a CSV row (header + data).
    pub fn to_csv_header() -> String {
        "scenario,strategy,size,regions,threads,cycles,total_wall_time_s,avg_cycle_ms,min_cycle_ms,max_cycle_ms,final_time,origin_energy,max_rel_diff,grind_us,fom".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6e},{:.3e},{:.6},{:.2}",
            self.scenario,
            self.strategy,
            self.size,
            self.regions,
            self.threads,
            self.cycles,
            self.total_wall_time,
            self.avg_cycle_time * 1000.0,
            self.min_cycle_time * 1000.0,
            self.max_cycle_time * 1000.0,
            self.final_time,
            self.origin_energy,
            self.max_rel_diff,
            self.grind_time,
            self.fom,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }

    /// Format multiple metrics as a pretty-printed JSON array.
    pub fn to_json(metrics: &[BenchmarkMetrics]) -> HydroResult<String> {
        serde_json::to_string_pretty(metrics).map_err(|e| HydroError::Serialization(e.to_string()))
    }
}
