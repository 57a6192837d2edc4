//! Phase scheduler.
//!
//! A phase is one `rayon` scope on a dedicated thread pool. Chunk tasks
//! are spawned into the scope (and may spawn continuations into it); the
//! end of the scope is the join that orders phases. Tasks report through
//! a channel, so a failed chunk never touches shared state and the error
//! surfaces at the join.

use std::fmt;
use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

use hexflow_types::{HydroError, HydroResult};

/// The five phases of a cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Force,
    Integrate,
    Kinematics,
    Material,
    Constraints,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Force,
        Phase::Integrate,
        Phase::Kinematics,
        Phase::Material,
        Phase::Constraints,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Force => "force",
            Phase::Integrate => "integrate",
            Phase::Kinematics => "kinematics",
            Phase::Material => "material",
            Phase::Constraints => "constraints",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chunk count and wall time of one joined phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseStats {
    pub phase: Phase,
    /// Chunk results received at the join.
    pub chunks: usize,
    pub wall_time: Duration,
}

/// Phases completed in the current (or last) cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleStats {
    pub phases: Vec<PhaseStats>,
}

impl CycleStats {
    pub fn total_chunks(&self) -> usize {
        self.phases.iter().map(|p| p.chunks).sum()
    }

    pub fn wall_time(&self) -> Duration {
        self.phases.iter().map(|p| p.wall_time).sum()
    }

    pub fn get(&self, phase: Phase) -> Option<&PhaseStats> {
        self.phases.iter().find(|p| p.phase == phase)
    }
}

/// Result channel handed to the tasks of one phase.
pub struct ChunkSink<T> {
    tx: Sender<(usize, HydroResult<T>)>,
}

impl<T> Clone for ChunkSink<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> ChunkSink<T> {
    /// Reports the result of chunk `chunk`.
    pub fn send(&self, chunk: usize, result: HydroResult<T>) {
        // The receiver lives until the phase joins, so this cannot fail
        // while a task is running.
        let _ = self.tx.send((chunk, result));
    }
}

/// Runs phases on a private thread pool.
pub struct TaskScheduler {
    pool: rayon::ThreadPool,
    stats: CycleStats,
}

impl TaskScheduler {
    /// Builds a pool of `threads` workers (0 = one per core).
    pub fn new(threads: usize) -> HydroResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hexflow-worker-{}", i))
            .build()
            .map_err(|e| HydroError::Scheduler(format!("Failed to build thread pool: {}", e)))?;
        Ok(Self {
            pool,
            stats: CycleStats::default(),
        })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Clears the per-cycle statistics.
    pub fn begin_cycle(&mut self) {
        self.stats.phases.clear();
    }

    pub fn cycle_stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Runs one phase and joins it.
    ///
    /// `body` spawns the phase's tasks into the scope; each task reports
    /// its chunk index and result through the sink. Returns the results
    /// ordered by chunk index, or the error of the lowest failing chunk.
    /// `expected` is the number of chunks the body reports.
    pub fn run_phase<'scope, T, F>(
        &mut self,
        phase: Phase,
        expected: usize,
        body: F,
    ) -> HydroResult<Vec<T>>
    where
        T: Send + 'scope,
        F: FnOnce(&rayon::Scope<'scope>, ChunkSink<T>) + Send,
    {
        let start = Instant::now();
        let (tx, rx) = mpsc::channel();
        let sink = ChunkSink { tx };
        self.pool.scope(move |scope| body(scope, sink));

        let mut results: Vec<(usize, HydroResult<T>)> = rx.try_iter().collect();
        let wall_time = start.elapsed();
        self.stats.phases.push(PhaseStats {
            phase,
            chunks: results.len(),
            wall_time,
        });
        tracing::debug!(
            phase = phase.label(),
            chunks = results.len(),
            wall_ms = wall_time.as_secs_f64() * 1e3,
            "Phase joined"
        );

        if results.len() != expected {
            return Err(HydroError::Scheduler(format!(
                "Phase {} joined with {} of {} chunks",
                phase,
                results.len(),
                expected
            )));
        }

        results.sort_by_key(|(chunk, _)| *chunk);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

impl fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("threads", &self.num_threads())
            .field("stats", &self.stats)
            .finish()
    }
}
