//! Task-graph leapfrog cycle.
//!
//! Runs the five phases of a cycle on the [`TaskScheduler`]. Every phase
//! hands its tasks disjoint mutable slabs (or writes nothing shared and
//! reports through the result channel), so no task takes a lock. A
//! failing chunk aborts the cycle at the next join.

use std::time::Instant;

use glam::DVec3;
use hexflow_math::DirectionalGradients;
use hexflow_mesh::{ElemState, HexMesh, KinematicsSlab, MeshState};
use hexflow_telemetry::{EventBus, EventKind, HydroEvent};
use hexflow_types::HydroResult;

use crate::config::{PhaseSizes, SolverConfig};
use crate::constraints::{reduce_bounds, ConstraintBounds};
use crate::force::{combine_corner_forces, corner_forces_chunk, ForceInputs};
use crate::integrate::{integrate_slab, NodeInputs};
use crate::kinematics::{gradients_chunk, kinematics_slab, KinematicsInputs};
use crate::material::{self, ImbalancePolicy, MaterialContext};
use crate::partition::ChunkPlan;
use crate::pool::BufferPool;
use crate::scheduler::{CycleStats, Phase, TaskScheduler};
use crate::strategy::LagrangeStrategy;

/// Parallel cycle engine.
pub struct TaskGraphLeapfrog {
    config: SolverConfig,
    sizes: PhaseSizes,
    scheduler: TaskScheduler,
    corner_pool: BufferPool<DVec3>,
    gradient_pool: BufferPool<DirectionalGradients>,
    events: Option<EventBus>,
}

impl TaskGraphLeapfrog {
    /// Validates the task sizes and builds the worker pool.
    pub fn new(config: SolverConfig) -> HydroResult<Self> {
        let sizes = config.task_sizes.phase_sizes()?;
        let scheduler = TaskScheduler::new(config.threads)?;
        tracing::info!(
            threads = scheduler.num_threads(),
            nodal = sizes.nodal.get(),
            elements = sizes.elements.get(),
            constraints = sizes.constraints.get(),
            "Task-graph solver ready"
        );
        Ok(Self {
            config,
            sizes,
            scheduler,
            corner_pool: BufferPool::new(2),
            gradient_pool: BufferPool::new(1),
            events: None,
        })
    }

    /// Attaches an event bus; cycle and phase events are flushed to it at
    /// the end of every cycle.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn events_mut(&mut self) -> Option<&mut EventBus> {
        self.events.as_mut()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Statistics of the phases joined in the last cycle.
    pub fn cycle_stats(&self) -> &CycleStats {
        self.scheduler.cycle_stats()
    }

    fn run_cycle(&mut self, state: &mut MeshState, dt: f64) -> HydroResult<ConstraintBounds> {
        let Self {
            sizes,
            scheduler,
            corner_pool,
            gradient_pool,
            ..
        } = self;
        let sizes = *sizes;
        scheduler.begin_cycle();

        let params = state.params;
        let MeshState {
            mesh, nodes, elems, ..
        } = state;
        let mesh: &HexMesh = mesh;
        let num_elem = mesh.num_elem();

        // (a) corner forces per element chunk
        let mut stress = corner_pool.acquire(8 * num_elem);
        let mut hourglass = corner_pool.acquire(8 * num_elem);
        {
            let inputs = ForceInputs {
                mesh,
                nodes: &*nodes,
                elems: &*elems,
                hgcoef: params.hgcoef,
            };
            let plan = ChunkPlan::with_size(num_elem, sizes.nodal);
            let corner_chunk = 8 * sizes.nodal.get();
            let stress_chunks = stress.chunks_mut(corner_chunk);
            let hourglass_chunks = hourglass.chunks_mut(corner_chunk);
            scheduler.run_phase(Phase::Force, plan.len(), move |scope, sink| {
                let chunks = plan.ranges().zip(stress_chunks).zip(hourglass_chunks);
                for (chunk, ((range, stress), hourglass)) in chunks.enumerate() {
                    let sink = sink.clone();
                    scope.spawn(move |_| {
                        sink.send(chunk, corner_forces_chunk(&inputs, range, stress, hourglass));
                    });
                }
            })?;
        }

        // (b) combine and integrate per node chunk
        {
            let stress: &[DVec3] = &stress;
            let hourglass: &[DVec3] = &hourglass;
            let adjacency = &mesh.adjacency;
            let inputs = NodeInputs {
                nodal_mass: &mesh.nodal_mass,
                symmetry: &mesh.node_symmetry,
                dt,
                u_cut: params.u_cut,
            };
            let plan = ChunkPlan::with_size(nodes.len(), sizes.nodal);
            let slabs = nodes.slabs_mut(sizes.nodal);
            scheduler.run_phase(Phase::Integrate, plan.len(), move |scope, sink| {
                for (chunk, mut slab) in slabs.enumerate() {
                    let sink = sink.clone();
                    scope.spawn(move |_| {
                        combine_corner_forces(adjacency, stress, hourglass, slab.start, slab.force);
                        integrate_slab(&inputs, &mut slab);
                        sink.send(chunk, Ok(()));
                    });
                }
            })?;
        }
        drop(stress);
        drop(hourglass);

        // (c) kinematics, then gradients as a continuation
        let mut gradients = gradient_pool.acquire(num_elem);
        {
            let inputs = KinematicsInputs {
                mesh,
                nodes: &*nodes,
                params: &params,
                dt,
            };
            let plan = ChunkPlan::with_size(num_elem, sizes.elements);
            let slabs = elems.kinematics_slabs_mut(sizes.elements);
            let gradient_chunks = gradients.chunks_mut(sizes.elements.get());
            scheduler.run_phase(Phase::Kinematics, plan.len(), move |scope, sink| {
                for (chunk, (mut slab, out)) in slabs.zip(gradient_chunks).enumerate() {
                    let sink = sink.clone();
                    scope.spawn(move |scope| {
                        if let Err(e) = kinematics_slab(&inputs, &mut slab) {
                            sink.send(chunk, Err(e));
                            return;
                        }
                        let KinematicsSlab { start, vnew, .. } = slab;
                        let vnew: &[f64] = vnew;
                        scope.spawn(move |_| {
                            gradients_chunk(inputs.mesh, inputs.nodes, start, vnew, out);
                            sink.send(chunk, Ok(()));
                        });
                    });
                }
            })?;
        }

        // (d) material relaxation per region sub-chunk
        let updates = {
            let ctx = MaterialContext {
                mesh,
                elems: &*elems,
                gradients: &gradients[..],
                params: &params,
            };
            let num_regions = mesh.num_regions();
            let mut tasks = Vec::new();
            for (index, region) in mesh.regions.iter().enumerate() {
                let repetitions = ImbalancePolicy::repetitions(index, num_regions, region.cost);
                for range in ChunkPlan::region_split(region.len(), sizes.elements) {
                    tasks.push((&region.elems[range], repetitions));
                }
            }
            scheduler.run_phase(Phase::Material, tasks.len(), move |scope, sink| {
                for (chunk, (list, repetitions)) in tasks.into_iter().enumerate() {
                    material::spawn_relaxation(scope, ctx, chunk, list, repetitions, sink.clone());
                }
            })?
        };
        drop(gradients);
        for batch in &updates {
            material::commit(elems, batch);
        }

        // (e) timestep constraints per region chunk
        let elems: &ElemState = elems;
        let mut tasks = Vec::new();
        for region in mesh.regions.iter() {
            for range in ChunkPlan::with_size(region.len(), sizes.constraints).ranges() {
                tasks.push(&region.elems[range]);
            }
        }
        let partials = scheduler.run_phase(Phase::Constraints, tasks.len(), move |scope, sink| {
            for (chunk, list) in tasks.into_iter().enumerate() {
                let sink = sink.clone();
                scope.spawn(move |_| sink.send(chunk, Ok(reduce_bounds(elems, list, &params))));
            }
        })?;

        Ok(partials
            .into_iter()
            .fold(ConstraintBounds::UNCONSTRAINED, ConstraintBounds::merge))
    }

    fn publish(&mut self, cycle: u64, outcome: &HydroResult<ConstraintBounds>, wall_time: f64) {
        let Some(bus) = self.events.as_mut() else {
            return;
        };
        for stats in &self.scheduler.cycle_stats().phases {
            bus.emit(HydroEvent::new(
                cycle,
                EventKind::PhaseComplete {
                    phase: stats.phase.label().to_string(),
                    chunks: stats.chunks,
                    wall_time: stats.wall_time.as_secs_f64(),
                },
            ));
        }
        let kind = match outcome {
            Ok(bounds) => EventKind::CycleEnd {
                dtcourant: bounds.courant,
                dthydro: bounds.hydro,
                wall_time,
            },
            Err(e) => EventKind::CycleAborted {
                error: e.to_string(),
            },
        };
        bus.emit(HydroEvent::new(cycle, kind));
        bus.flush();
    }
}

impl LagrangeStrategy for TaskGraphLeapfrog {
    fn advance_cycle(&mut self, state: &mut MeshState, dt: f64) -> HydroResult<ConstraintBounds> {
        let cycle = state.clock.cycle;
        if let Some(bus) = &self.events {
            bus.emit(HydroEvent::new(
                cycle,
                EventKind::CycleBegin {
                    time: state.clock.time,
                    dt,
                },
            ));
        }

        let start = Instant::now();
        let outcome = self.run_cycle(state, dt);
        if let Err(e) = &outcome {
            tracing::warn!(cycle, error = %e, "Cycle aborted");
        }
        self.publish(cycle, &outcome, start.elapsed().as_secs_f64());
        outcome
    }

    fn name(&self) -> &str {
        "Task-Graph Leapfrog"
    }

    fn num_threads(&self) -> usize {
        self.scheduler.num_threads()
    }
}
