//! Solver configuration.
//!
//! Chunk granularity of the three phase families and the worker count.
//! Passed to the scheduler at construction; nothing here is global.

use std::num::NonZeroUsize;

use hexflow_types::constants::DEFAULT_TASK_SIZE;
use hexflow_types::{HydroError, HydroResult};
use serde::{Deserialize, Serialize};

/// Chunk sizes of the cycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSizes {
    /// Element chunks of the force phase and node chunks of the
    /// integrate phase.
    pub nodal: usize,
    /// Kinematics chunks and material sub-chunks.
    pub elements: usize,
    /// Constraint-reduction chunks within a region.
    pub constraints: usize,
}

/// [`TaskSizes`] after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSizes {
    pub nodal: NonZeroUsize,
    pub elements: NonZeroUsize,
    pub constraints: NonZeroUsize,
}

impl Default for TaskSizes {
    fn default() -> Self {
        Self::uniform(DEFAULT_TASK_SIZE)
    }
}

impl TaskSizes {
    /// The same size for every phase.
    pub fn uniform(size: usize) -> Self {
        Self {
            nodal: size,
            elements: size,
            constraints: size,
        }
    }

    /// Tuned sizes for the standard cube sizes; the default elsewhere.
    pub fn for_problem_size(size: usize) -> Self {
        let (nodal, elements, constraints) = match size {
            45 => (2048, 2048, 8192),
            60 => (4096, 2048, 8192),
            75 | 90 => (8192, 4096, 8192),
            120 | 150 => (8192, 2048, 8192),
            _ => return Self::default(),
        };
        Self {
            nodal,
            elements,
            constraints,
        }
    }

    /// Parses `"nodal,elements,constraints"`.
    ///
    /// # Example
    /// ```
    /// use hexflow_solver::config::TaskSizes;
    /// let sizes = TaskSizes::parse("2048,4096,2048").unwrap();
    /// assert_eq!(sizes.elements, 4096);
    /// assert!(TaskSizes::parse("1,0,1").is_err());
    /// ```
    pub fn parse(text: &str) -> HydroResult<Self> {
        let mut sizes = Vec::with_capacity(3);
        for item in text.split(',') {
            let item = item.trim();
            let size: usize = item.parse().map_err(|_| {
                HydroError::InvalidConfig(format!("Invalid task size '{}'", item))
            })?;
            if size == 0 {
                return Err(HydroError::InvalidConfig(
                    "Task size of zero is not allowed".into(),
                ));
            }
            sizes.push(size);
        }
        match sizes.as_slice() {
            &[nodal, elements, constraints] => Ok(Self {
                nodal,
                elements,
                constraints,
            }),
            _ => Err(HydroError::InvalidConfig(
                "Wrong number of arguments to 'task size', expected three".into(),
            )),
        }
    }

    /// Rejects zero sizes.
    pub fn validate(&self) -> HydroResult<()> {
        self.phase_sizes().map(|_| ())
    }

    pub fn phase_sizes(&self) -> HydroResult<PhaseSizes> {
        let nonzero = |size: usize| {
            NonZeroUsize::new(size).ok_or_else(|| {
                HydroError::InvalidConfig("Task size of zero is not allowed".into())
            })
        };
        Ok(PhaseSizes {
            nodal: nonzero(self.nodal)?,
            elements: nonzero(self.elements)?,
            constraints: nonzero(self.constraints)?,
        })
    }
}

/// Configuration for the cycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Worker threads; 0 lets rayon pick one per core.
    pub threads: usize,
    pub task_sizes: TaskSizes,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            task_sizes: TaskSizes::default(),
        }
    }
}

impl SolverConfig {
    /// Creates a config for debugging: single-item chunks on two workers,
    /// so every phase runs the maximum number of tasks.
    pub fn debug() -> Self {
        Self {
            threads: 2,
            task_sizes: TaskSizes::uniform(1),
        }
    }

    /// Tuned chunk sizes for a cube of `size³` elements.
    pub fn for_problem_size(size: usize) -> Self {
        Self {
            task_sizes: TaskSizes::for_problem_size(size),
            ..Default::default()
        }
    }
}
