//! Integration tests for hexflow-solver.

use std::num::NonZeroUsize;

use approx::assert_relative_eq;
use hexflow_math::{DVec3, DirectionalGradients};
use hexflow_mesh::generators::{sedov_cube, SedovConfig};
use hexflow_mesh::{ElemState, HydroParams, MeshState, NodeState, SimClock, SymmetryMask};
use hexflow_solver::constraints::{element_bounds, reduce_all, reduce_bounds};
use hexflow_solver::force::{
    combine_corner_forces, corner_forces_chunk, hourglass_corner_forces, stress_corner_forces,
    ForceInputs,
};
use hexflow_solver::integrate::{integrate_slab, NodeInputs};
use hexflow_solver::kinematics::{kinematics_slab, KinematicsInputs};
use hexflow_solver::material::{relax_elements, MaterialContext};
use hexflow_solver::pool::BufferPool;
use hexflow_solver::timestep::time_increment;
use hexflow_solver::{
    ChunkPlan, ConstraintBounds, ImbalancePolicy, LagrangeStrategy, Phase, RunConfig,
    SerialLeapfrog, Simulation, SolverConfig, TaskGraphLeapfrog, TaskScheduler, TaskSizes,
};
use hexflow_telemetry::{EventBus, EventKind, VecSink};
use hexflow_types::HydroError;

fn sedov(size: usize, num_regions: usize, cost: u32) -> MeshState {
    sedov_cube(&SedovConfig {
        size,
        num_regions,
        cost,
        ..Default::default()
    })
    .unwrap()
}

fn task_graph(
    nodal: usize,
    elements: usize,
    constraints: usize,
    threads: usize,
) -> TaskGraphLeapfrog {
    TaskGraphLeapfrog::new(SolverConfig {
        threads,
        task_sizes: TaskSizes {
            nodal,
            elements,
            constraints,
        },
    })
    .unwrap()
}

/// Runs `cycles` cycles with the adaptive timestep and returns the state.
fn run_cycles(
    mut state: MeshState,
    strategy: &mut dyn LagrangeStrategy,
    cycles: usize,
) -> MeshState {
    for _ in 0..cycles {
        let dt = time_increment(&mut state.clock, &state.params);
        let bounds = strategy.advance_cycle(&mut state, dt).unwrap();
        state.clock.dtcourant = bounds.courant;
        state.clock.dthydro = bounds.hydro;
    }
    state
}

fn assert_same_state(a: &MeshState, b: &MeshState) {
    assert_eq!(a.nodes.pos, b.nodes.pos);
    assert_eq!(a.nodes.vel, b.nodes.vel);
    assert_eq!(a.elems.v, b.elems.v);
    assert_eq!(a.elems.e, b.elems.e);
    assert_eq!(a.elems.p, b.elems.p);
    assert_eq!(a.elems.q, b.elems.q);
    assert_eq!(a.elems.ss, b.elems.ss);
    assert_eq!(a.clock, b.clock);
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn task_sizes_parse() {
    let sizes = TaskSizes::parse("2048, 4096,8192").unwrap();
    assert_eq!(
        sizes,
        TaskSizes {
            nodal: 2048,
            elements: 4096,
            constraints: 8192
        }
    );
}

#[test]
fn task_sizes_reject_zero() {
    let err = TaskSizes::parse("1,0,1").unwrap_err();
    assert!(err.to_string().contains("Task size of zero is not allowed"));
    assert!(TaskSizes::uniform(0).validate().is_err());
}

#[test]
fn task_sizes_reject_wrong_arity() {
    for text in ["1,2", "1,2,3,4", "7"] {
        let err = TaskSizes::parse(text).unwrap_err();
        assert!(err.to_string().contains("Wrong number of arguments to 'task size'"));
    }
    assert!(TaskSizes::parse("a,b,c").is_err());
}

#[test]
fn task_size_presets() {
    assert_eq!(
        TaskSizes::for_problem_size(45),
        TaskSizes {
            nodal: 2048,
            elements: 2048,
            constraints: 8192
        }
    );
    assert_eq!(TaskSizes::for_problem_size(90).elements, 4096);
    assert_eq!(TaskSizes::for_problem_size(150).elements, 2048);
    assert_eq!(TaskSizes::for_problem_size(30), TaskSizes::uniform(1024));
}

#[test]
fn solver_config_toml_roundtrip() {
    let config = SolverConfig::debug();
    let text = toml::to_string(&config).unwrap();
    let back: SolverConfig = toml::from_str(&text).unwrap();
    assert_eq!(config, back);
}

#[test]
fn solver_config_json_roundtrip() {
    let config = SolverConfig {
        threads: 3,
        task_sizes: TaskSizes::for_problem_size(60),
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: SolverConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, back);

    let bounds = ConstraintBounds {
        courant: 2.5e-4,
        hydro: 1.0e-3,
    };
    let json = serde_json::to_string(&bounds).unwrap();
    assert_eq!(serde_json::from_str::<ConstraintBounds>(&json).unwrap(), bounds);
}

#[test]
fn zero_task_size_rejected_before_any_cycle() {
    let config = SolverConfig {
        threads: 1,
        task_sizes: TaskSizes {
            nodal: 16,
            elements: 0,
            constraints: 16,
        },
    };
    assert!(matches!(
        TaskGraphLeapfrog::new(config),
        Err(HydroError::InvalidConfig(_))
    ));
}

// ─── Partition Tests ──────────────────────────────────────────

#[test]
fn chunk_plan_ranges() {
    let plan = ChunkPlan::new(10, 3).unwrap();
    assert_eq!(plan.len(), 4);
    let ranges: Vec<_> = plan.ranges().collect();
    assert_eq!(ranges, vec![0..3, 3..6, 6..9, 9..10]);
}

#[test]
fn chunk_plan_covers_range_exactly_once() {
    for total in [0, 1, 7, 64, 1000] {
        for size in [1, 3, 64, 5000] {
            let plan = ChunkPlan::new(total, size).unwrap();
            let covered: Vec<usize> = plan.ranges().flatten().collect();
            assert_eq!(covered, (0..total).collect::<Vec<_>>());
            assert_eq!(plan.ranges().count(), plan.len());
        }
    }
}

#[test]
fn chunk_plan_rejects_zero_size() {
    let err = ChunkPlan::new(10, 0).unwrap_err();
    assert!(err.to_string().contains("Task size of zero is not allowed"));
}

#[test]
fn region_split_rule() {
    let four = NonZeroUsize::new(4).unwrap();
    assert!(ChunkPlan::region_split(0, four).is_empty());
    assert_eq!(ChunkPlan::region_split(3, four), vec![0..3]);
    assert_eq!(ChunkPlan::region_split(8, four), vec![0..4, 4..8]);
    // remainder 1 is within 30% of 4: folded into the last chunk
    assert_eq!(ChunkPlan::region_split(9, four), vec![0..4, 4..9]);
    // remainder 2 exceeds it: one more chunk, evenly sized
    assert_eq!(ChunkPlan::region_split(10, four), vec![0..3, 3..6, 6..10]);
}

#[test]
fn region_split_covers_region() {
    for len in 1..200 {
        for size in [1, 2, 5, 16, 64] {
            let ranges = ChunkPlan::region_split(len, NonZeroUsize::new(size).unwrap());
            let covered: Vec<usize> = ranges.iter().cloned().flatten().collect();
            assert_eq!(covered, (0..len).collect::<Vec<_>>());
        }
    }
}

// ─── Imbalance Policy Tests ───────────────────────────────────

#[test]
fn imbalance_single_region() {
    assert_eq!(ImbalancePolicy::repetitions(0, 1, 1), 2);
}

#[test]
fn imbalance_eleven_regions() {
    let reps: Vec<usize> = (0..11).map(|r| ImbalancePolicy::repetitions(r, 11, 1)).collect();
    assert_eq!(reps, vec![1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 20]);
}

#[test]
fn imbalance_twenty_one_regions() {
    assert_eq!(ImbalancePolicy::repetitions(9, 21, 3), 1);
    assert_eq!(ImbalancePolicy::repetitions(10, 21, 3), 4);
    assert_eq!(ImbalancePolicy::repetitions(19, 21, 3), 4);
    assert_eq!(ImbalancePolicy::repetitions(20, 21, 3), 40);
}

// ─── Scheduler / Pool Tests ───────────────────────────────────

#[test]
fn scheduler_orders_results_by_chunk() {
    let mut scheduler = TaskScheduler::new(2).unwrap();
    assert_eq!(scheduler.num_threads(), 2);
    let out: Vec<usize> = scheduler
        .run_phase(Phase::Force, 10, |scope, sink| {
            for chunk in 0..10 {
                let sink = sink.clone();
                scope.spawn(move |_| sink.send(chunk, Ok(chunk * 2)));
            }
        })
        .unwrap();
    assert_eq!(out, (0..10).map(|c| c * 2).collect::<Vec<_>>());
}

#[test]
fn scheduler_reports_lowest_failing_chunk() {
    let mut scheduler = TaskScheduler::new(3).unwrap();
    let result = scheduler.run_phase(Phase::Material, 8, |scope, sink| {
        for chunk in (0..8).rev() {
            let sink = sink.clone();
            scope.spawn(move |_| {
                let result = if chunk == 3 || chunk == 6 {
                    Err(HydroError::InvalidMesh(format!("chunk {}", chunk)))
                } else {
                    Ok(chunk)
                };
                sink.send(chunk, result);
            });
        }
    });
    match result {
        Err(HydroError::InvalidMesh(msg)) => assert_eq!(msg, "chunk 3"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn scheduler_detects_missing_chunks() {
    let mut scheduler = TaskScheduler::new(1).unwrap();
    let result = scheduler.run_phase(Phase::Constraints, 3, |scope, sink| {
        let sink = sink.clone();
        scope.spawn(move |_| sink.send(0, Ok(())));
    });
    assert!(matches!(result, Err(HydroError::Scheduler(_))));
}

#[test]
fn scheduler_records_phase_stats() {
    let mut scheduler = TaskScheduler::new(2).unwrap();
    scheduler.begin_cycle();
    for phase in [Phase::Force, Phase::Integrate] {
        scheduler
            .run_phase(phase, 4, |scope, sink| {
                for chunk in 0..4 {
                    let sink = sink.clone();
                    scope.spawn(move |_| sink.send(chunk, Ok(())));
                }
            })
            .unwrap();
    }
    let stats = scheduler.cycle_stats();
    assert_eq!(stats.phases.len(), 2);
    assert_eq!(stats.total_chunks(), 8);
    assert_eq!(stats.get(Phase::Integrate).unwrap().chunks, 4);
    assert!(stats.get(Phase::Material).is_none());
}

#[test]
fn phase_labels() {
    let labels: Vec<&str> = Phase::ALL.iter().map(|p| p.label()).collect();
    assert_eq!(
        labels,
        vec!["force", "integrate", "kinematics", "material", "constraints"]
    );
}

#[test]
fn pool_reuses_zeroed_buffers() {
    let pool: BufferPool<f64> = BufferPool::new(1);
    {
        let mut a = pool.acquire(16);
        let b = pool.acquire(8);
        a[3] = 5.0;
        assert_eq!(b.len(), 8);
    }
    // only one idle buffer is kept
    assert_eq!(pool.available(), 1);
    let c = pool.acquire(32);
    assert_eq!(c.len(), 32);
    assert!(c.iter().all(|&x| x == 0.0));
    assert_eq!(pool.available(), 0);
}

// ─── Force Tests ──────────────────────────────────────────────

fn unit_cube() -> [DVec3; 8] {
    [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::new(1.0, 0.0, 1.0),
        DVec3::new(1.0, 1.0, 1.0),
        DVec3::new(0.0, 1.0, 1.0),
    ]
}

#[test]
fn pressure_pushes_corners_outward() {
    let forces = stress_corner_forces(0, &unit_cube(), 1.0, 0.0).unwrap();
    assert_relative_eq!(forces[0].x, -0.25, epsilon = 1e-14);
    assert_relative_eq!(forces[6].z, 0.25, epsilon = 1e-14);
    let sum: DVec3 = forces.iter().copied().sum();
    assert!(sum.length() < 1e-14);
}

#[test]
fn collapsed_element_is_degenerate() {
    let x = [DVec3::ONE; 8];
    let err = stress_corner_forces(4, &x, 1.0, 0.0).unwrap_err();
    match err {
        HydroError::ElementDegenerate { elem, .. } => assert_eq!(elem.index(), 4),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn hourglass_rejects_non_positive_volume() {
    let x = unit_cube();
    let xd = [DVec3::ZERO; 8];
    let err = hourglass_corner_forces(2, &x, &xd, 0.0, 1.0, 1.0, 3.0).unwrap_err();
    assert!(matches!(err, HydroError::VolumeError { .. }));
}

#[test]
fn hourglass_ignores_translation() {
    let xd = [DVec3::new(1.0, -2.0, 0.5); 8];
    let forces = hourglass_corner_forces(0, &unit_cube(), &xd, 1.0, 1.0, 1.0, 3.0).unwrap();
    for f in forces {
        assert!(f.length() < 1e-13);
    }
}

#[test]
fn combine_sums_every_corner_of_a_node() {
    let state = sedov(3, 1, 1);
    let num_corners = 8 * state.num_elem();
    let stress = vec![DVec3::X; num_corners];
    let hourglass = vec![DVec3::Y; num_corners];
    let mut force = vec![DVec3::ZERO; state.num_node()];
    combine_corner_forces(&state.mesh.adjacency, &stress, &hourglass, 0, &mut force);
    for (node, f) in force.iter().enumerate() {
        let k = state.mesh.adjacency.valence(node) as f64;
        assert_eq!(*f, DVec3::new(k, k, 0.0));
    }
}

#[test]
fn uniform_pressure_balances_interior_nodes() {
    let mut state = sedov(3, 1, 1);
    state.elems.p.iter_mut().for_each(|p| *p = 1.0);
    let n = state.num_elem();
    let mut stress = vec![DVec3::ZERO; 8 * n];
    let mut hourglass = vec![DVec3::ZERO; 8 * n];
    let inputs = ForceInputs {
        mesh: &state.mesh,
        nodes: &state.nodes,
        elems: &state.elems,
        hgcoef: state.params.hgcoef,
    };
    corner_forces_chunk(&inputs, 0..n, &mut stress, &mut hourglass).unwrap();
    let mut force = vec![DVec3::ZERO; state.num_node()];
    combine_corner_forces(&state.mesh.adjacency, &stress, &hourglass, 0, &mut force);

    // node (1, 1, 1) is surrounded by eight elements
    assert!(force[21].length() < 1e-12);
    // the far corner is pushed outward
    let corner = force[63];
    assert!(corner.x > 0.0 && corner.y > 0.0 && corner.z > 0.0);
}

#[test]
fn corner_forces_independent_of_chunking() {
    let mut state = sedov(4, 1, 1);
    for (i, p) in state.elems.p.iter_mut().enumerate() {
        *p = 1.0 + 0.01 * i as f64;
    }
    for (i, v) in state.nodes.vel.iter_mut().enumerate() {
        *v = DVec3::new((i % 3) as f64, (i % 5) as f64 * 0.1, -((i % 7) as f64) * 0.01);
    }
    state.elems.ss.iter_mut().for_each(|ss| *ss = 2.0);
    let n = state.num_elem();
    let inputs = ForceInputs {
        mesh: &state.mesh,
        nodes: &state.nodes,
        elems: &state.elems,
        hgcoef: state.params.hgcoef,
    };

    let mut whole_s = vec![DVec3::ZERO; 8 * n];
    let mut whole_h = vec![DVec3::ZERO; 8 * n];
    corner_forces_chunk(&inputs, 0..n, &mut whole_s, &mut whole_h).unwrap();

    let mut split_s = vec![DVec3::ZERO; 8 * n];
    let mut split_h = vec![DVec3::ZERO; 8 * n];
    let plan = ChunkPlan::new(n, 5).unwrap();
    for ((range, s), h) in plan
        .ranges()
        .zip(split_s.chunks_mut(40))
        .zip(split_h.chunks_mut(40))
    {
        corner_forces_chunk(&inputs, range, s, h).unwrap();
    }
    assert_eq!(whole_s, split_s);
    assert_eq!(whole_h, split_h);
}

// ─── Integrate Tests ──────────────────────────────────────────

#[test]
fn integrate_applies_symmetry_and_moves_nodes() {
    let mut nodes = NodeState::at_rest(vec![DVec3::ZERO, DVec3::ONE]);
    nodes.force = vec![DVec3::new(2.0, 4.0, 6.0), DVec3::new(2.0, 4.0, 6.0)];
    let masses = [2.0, 2.0];
    let symmetry = [SymmetryMask::X, SymmetryMask::NONE];
    let inputs = NodeInputs {
        nodal_mass: &masses,
        symmetry: &symmetry,
        dt: 0.5,
        u_cut: 1e-7,
    };
    for mut slab in nodes.slabs_mut(NonZeroUsize::new(2).unwrap()) {
        integrate_slab(&inputs, &mut slab);
    }
    assert_eq!(nodes.acc[0], DVec3::new(0.0, 2.0, 3.0));
    assert_eq!(nodes.vel[0], DVec3::new(0.0, 1.0, 1.5));
    assert_eq!(nodes.pos[0], DVec3::new(0.0, 0.5, 0.75));
    assert_eq!(nodes.acc[1], DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(nodes.pos[1], DVec3::new(1.25, 1.5, 1.75));
}

#[test]
fn integrate_snaps_tiny_velocity() {
    let mut nodes = NodeState::at_rest(vec![DVec3::ZERO]);
    nodes.force = vec![DVec3::new(1e-8, 1.0, -1e-9)];
    let masses = [1.0];
    let symmetry = [SymmetryMask::NONE];
    let inputs = NodeInputs {
        nodal_mass: &masses,
        symmetry: &symmetry,
        dt: 1.0,
        u_cut: 1e-7,
    };
    for mut slab in nodes.slabs_mut(NonZeroUsize::new(1).unwrap()) {
        integrate_slab(&inputs, &mut slab);
    }
    assert_eq!(nodes.vel[0], DVec3::new(0.0, 1.0, 0.0));
    assert_eq!(nodes.pos[0], DVec3::new(0.0, 1.0, 0.0));
}

// ─── Kinematics Tests ─────────────────────────────────────────

#[test]
fn kinematics_at_rest() {
    let mut state = sedov(2, 1, 1);
    let h = 1.125 / 2.0;
    let MeshState {
        mesh,
        nodes,
        elems,
        params,
        ..
    } = &mut state;
    let inputs = KinematicsInputs {
        mesh,
        nodes,
        params,
        dt: 1e-3,
    };
    for mut slab in elems.kinematics_slabs_mut(NonZeroUsize::new(3).unwrap()) {
        kinematics_slab(&inputs, &mut slab).unwrap();
    }
    for e in 0..8 {
        assert_eq!(elems.v[e], 1.0);
        assert_relative_eq!(elems.vnew[e], 1.0, epsilon = 1e-14);
        assert_relative_eq!(elems.delv[e], 0.0, epsilon = 1e-14);
        assert_eq!(elems.vdov[e], 0.0);
        assert_relative_eq!(elems.arealg[e], h, epsilon = 1e-12);
    }
}

#[test]
fn kinematics_uniform_dilatation() {
    let mut state = sedov(2, 1, 1);
    let dt = 1e-3;
    state.nodes.vel = state.nodes.pos.clone();
    let MeshState {
        mesh,
        nodes,
        elems,
        params,
        ..
    } = &mut state;
    let inputs = KinematicsInputs {
        mesh,
        nodes,
        params,
        dt,
    };
    for mut slab in elems.kinematics_slabs_mut(NonZeroUsize::new(8).unwrap()) {
        kinematics_slab(&inputs, &mut slab).unwrap();
    }
    let expected = 3.0 / (1.0 - 0.5 * dt);
    for e in 0..8 {
        assert_relative_eq!(elems.vdov[e], expected, epsilon = 1e-10);
        assert!(elems.strain[e].dxx.abs() < 1e-10);
        assert!(elems.strain[e].dxy.abs() < 1e-10);
    }
}

// ─── Material Tests ───────────────────────────────────────────

#[test]
fn static_gas_keeps_its_state() {
    let mut state = sedov(2, 1, 1);
    state.elems.e.iter_mut().for_each(|e| *e = 1.0);
    state.elems.p.iter_mut().for_each(|p| *p = 2.0 / 3.0);
    let gradients = vec![DirectionalGradients::default(); state.num_elem()];
    let ctx = MaterialContext {
        mesh: &state.mesh,
        elems: &state.elems,
        gradients: &gradients,
        params: &state.params,
    };
    let elems: Vec<usize> = (0..state.num_elem()).collect();
    let once = relax_elements(&ctx, &elems, 1).unwrap();
    let many = relax_elements(&ctx, &elems, 7).unwrap();
    assert_eq!(once, many);
    for u in &once {
        assert_relative_eq!(u.e, 1.0, epsilon = 1e-14);
        assert_relative_eq!(u.p, 2.0 / 3.0, epsilon = 1e-14);
        assert_eq!(u.q, 0.0);
        assert_relative_eq!(u.ss, (10.0f64 / 9.0).sqrt(), epsilon = 1e-14);
    }
}

#[test]
fn tiny_energy_snaps_to_zero() {
    let mut state = sedov(2, 1, 1);
    state.elems.e.iter_mut().for_each(|e| *e = 5e-8);
    let mut strategy = SerialLeapfrog::new();
    strategy.advance_cycle(&mut state, 1e-6).unwrap();
    assert!(state.elems.e.iter().all(|&e| e == 0.0));
    assert!(state.elems.p.iter().all(|&p| p == 0.0));
}

#[test]
fn qstop_aborts_cycle() {
    let mut state = sedov(2, 1, 1);
    state.elems.q[3] = 1e13;
    let mut strategy = task_graph(2, 2, 2, 2);
    match strategy.advance_cycle(&mut state, 1e-12) {
        Err(HydroError::QStop { elem, q }) => {
            assert_eq!(elem.index(), 3);
            assert_eq!(q, 1e13);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

// ─── Constraint Tests ─────────────────────────────────────────

#[test]
fn static_element_is_unconstrained() {
    let elems = ElemState::undeformed(1);
    let bounds = element_bounds(&elems, 0, &HydroParams::default());
    assert_eq!(bounds.courant, f64::MAX);
    assert_eq!(bounds.hydro, f64::MAX);
    assert_eq!(
        reduce_bounds(&elems, &[0], &HydroParams::default()),
        ConstraintBounds::UNCONSTRAINED
    );
}

#[test]
fn compressing_element_bounds() {
    let mut elems = ElemState::undeformed(2);
    elems.vdov[0] = -1.0;
    elems.ss[0] = 1.0;
    elems.arealg[0] = 1.0;
    elems.vdov[1] = 0.5;
    elems.ss[1] = 2.0;
    elems.arealg[1] = 1.0;
    let params = HydroParams::default();

    let b0 = element_bounds(&elems, 0, &params);
    assert_relative_eq!(b0.courant, 1.0 / 257.0f64.sqrt(), epsilon = 1e-15);
    assert_relative_eq!(b0.hydro, 0.1, epsilon = 1e-15);

    // expansion adds no viscous term
    let b1 = element_bounds(&elems, 1, &params);
    assert_relative_eq!(b1.courant, 0.5, epsilon = 1e-15);
    assert_relative_eq!(b1.hydro, 0.2, epsilon = 1e-15);

    let all = reduce_all(&elems, &params);
    assert_eq!(all, b0.merge(b1));
    assert_eq!(all.courant, b0.courant);
    assert_eq!(all.hydro, b0.hydro);
}

#[test]
fn merge_is_componentwise_min() {
    let a = ConstraintBounds {
        courant: 1.0,
        hydro: 5.0,
    };
    let b = ConstraintBounds {
        courant: 3.0,
        hydro: 2.0,
    };
    assert_eq!(
        a.merge(b),
        ConstraintBounds {
            courant: 1.0,
            hydro: 2.0
        }
    );
    assert_eq!(ConstraintBounds::UNCONSTRAINED.merge(a), a);
}

// ─── Timestep Tests ───────────────────────────────────────────

fn clock(cycle: u64, deltatime: f64, dtcourant: f64, dthydro: f64) -> SimClock {
    SimClock {
        time: 0.0,
        deltatime,
        cycle,
        dtcourant,
        dthydro,
    }
}

#[test]
fn fixed_timestep_untouched() {
    let params = HydroParams {
        dtfixed: 1e-3,
        ..Default::default()
    };
    let mut c = clock(5, 1e-3, 1e-9, 1e-9);
    let dt = time_increment(&mut c, &params);
    assert_eq!(dt, 1e-3);
    assert_eq!(c.cycle, 6);
    assert_eq!(c.time, 1e-3);
}

#[test]
fn first_cycle_keeps_initial_step() {
    let params = HydroParams::default();
    let mut c = clock(0, 1e-7, 1e-9, 1e-9);
    assert_eq!(time_increment(&mut c, &params), 1e-7);
    assert_eq!(c.cycle, 1);
}

#[test]
fn timestep_growth_is_capped() {
    let params = HydroParams::default();
    let mut c = clock(1, 1e-4, 1.0, 1e20);
    assert_relative_eq!(time_increment(&mut c, &params), 1.2e-4, epsilon = 1e-18);
}

#[test]
fn small_growth_is_ignored_and_shrink_is_taken() {
    let params = HydroParams::default();
    let mut c = clock(1, 1e-4, 2.0 * 1.05e-4, 1e20);
    assert_eq!(time_increment(&mut c, &params), 1e-4);

    let mut c = clock(1, 1e-4, 1e20, 3e-5);
    assert_relative_eq!(time_increment(&mut c, &params), 2e-5, epsilon = 1e-18);
}

#[test]
fn timestep_clamped_to_dtmax() {
    let params = HydroParams {
        dtmax: 1e-5,
        ..Default::default()
    };
    let mut c = clock(3, 1e-4, 1.0, 1.0);
    assert_eq!(time_increment(&mut c, &params), 1e-5);
}

#[test]
fn final_step_lands_on_stop_time() {
    let params = HydroParams::default();
    let mut c = clock(0, 1e-4, 1.0, 1.0);
    c.time = params.stoptime - 5e-5;
    let dt = time_increment(&mut c, &params);
    assert_relative_eq!(dt, 5e-5, epsilon = 1e-15);
    assert_relative_eq!(c.time, params.stoptime, epsilon = 1e-15);
}

#[test]
fn near_stop_step_is_shortened() {
    let params = HydroParams::default();
    let mut c = clock(0, 1e-4, 1.0, 1.0);
    c.time = params.stoptime - 1.2e-4;
    let dt = time_increment(&mut c, &params);
    assert_relative_eq!(dt, 2.0e-4 / 3.0, epsilon = 1e-15);
}

// ─── Cycle Tests ──────────────────────────────────────────────

#[test]
fn strategies_agree_bit_for_bit() {
    let initial = sedov(5, 4, 2);
    let reference = run_cycles(initial.clone(), &mut SerialLeapfrog::new(), 6);

    for (nodal, elements, constraints, threads) in
        [(1, 1, 1, 2), (7, 3, 5, 3), (1024, 1024, 1024, 1), (16, 40, 2, 4)]
    {
        let mut strategy = task_graph(nodal, elements, constraints, threads);
        let state = run_cycles(initial.clone(), &mut strategy, 6);
        assert_same_state(&reference, &state);
    }
}

#[test]
fn energy_spreads_from_the_origin() {
    let state = run_cycles(sedov(4, 1, 1), &mut task_graph(8, 8, 8, 2), 10);
    assert!(state.elems.e[0] > 0.0);
    assert!(state.nodes.vel.iter().any(|v| v.length() > 0.0));
    assert!(state.elems.p.iter().all(|p| p.is_finite()));
    assert!(state.elems.v.iter().all(|&v| v > 0.0));
}

#[test]
fn expanding_cube_bounds() {
    let mut state = sedov(2, 1, 1);
    state.elems.e.iter_mut().for_each(|e| *e = 1.0);
    state.elems.p.iter_mut().for_each(|p| *p = 2.0 / 3.0);
    let mut serial_state = state.clone();

    let bounds = task_graph(3, 3, 3, 2).advance_cycle(&mut state, 1e-6).unwrap();
    let serial = SerialLeapfrog::new()
        .advance_cycle(&mut serial_state, 1e-6)
        .unwrap();
    assert_eq!(bounds, serial);

    assert!(bounds.courant.is_finite() && bounds.courant > 0.0 && bounds.courant < 1e20);
    assert!(bounds.hydro.is_finite() && bounds.hydro > 0.0 && bounds.hydro < 1e20);
    for e in 0..state.num_elem() {
        assert!((state.elems.v[e] - 1.0).abs() < 1e-3);
        assert!(state.elems.ss[e].is_finite() && state.elems.ss[e] > 0.0);
    }
}

#[test]
fn inverted_element_aborts_cycle() {
    let mut state = sedov(2, 1, 1);
    // without the EOS clamp a negative volume is fatal in kinematics
    state.params.eosvmin = 0.0;
    state.nodes.vel[13] = DVec3::new(1e4, 0.0, 0.0);
    let before = state.elems.clone();
    let mut serial_state = state.clone();

    let err = task_graph(2, 2, 2, 2)
        .advance_cycle(&mut state, 1e-3)
        .unwrap_err();
    match err {
        HydroError::VolumeError { elem, volume } => {
            assert_eq!(elem.index(), 1);
            assert!(volume <= 0.0);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(state.elems.e, before.e);
    assert_eq!(state.elems.p, before.p);
    assert_eq!(state.elems.q, before.q);
    assert_eq!(state.elems.ss, before.ss);

    let serial_err = SerialLeapfrog::new()
        .advance_cycle(&mut serial_state, 1e-3)
        .unwrap_err();
    assert_eq!(serial_err.to_string(), err.to_string());
}

#[test]
fn inverted_element_aborts_cycle_despite_clamp() {
    let mut state = sedov(2, 1, 1);
    state.elems.e.fill(1.0);
    state.nodes.vel[13] = DVec3::new(1e4, 0.0, 0.0);
    assert!(state.params.eosvmin > 0.0);
    let before = state.elems.clone();
    let mut serial_state = state.clone();

    let mut strategy = task_graph(4, 4, 4, 2);
    let err = strategy.advance_cycle(&mut state, 1e-3).unwrap_err();
    match err {
        HydroError::VolumeError { elem, volume } => {
            assert_eq!(elem.index(), 1);
            assert!(volume < 0.0);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.is_fatal_geometry());
    assert_eq!(state.elems.e, before.e);
    assert_eq!(state.elems.p, before.p);
    assert_eq!(state.elems.q, before.q);
    assert_eq!(state.elems.ss, before.ss);
    // material never ran
    assert!(strategy.cycle_stats().get(Phase::Material).is_none());

    let serial_err = SerialLeapfrog::new()
        .advance_cycle(&mut serial_state, 1e-3)
        .unwrap_err();
    assert_eq!(serial_err.to_string(), err.to_string());
}

#[test]
fn bounds_stay_positive_over_sedov_cycles() {
    let mut state = sedov(4, 3, 1);
    let mut strategy = task_graph(16, 8, 8, 2);
    for _ in 0..15 {
        let dt = time_increment(&mut state.clock, &state.params);
        assert!(dt.is_finite() && dt > 0.0);
        let bounds = strategy.advance_cycle(&mut state, dt).unwrap();
        assert!(bounds.courant.is_finite() && bounds.courant > 0.0);
        assert!(bounds.hydro.is_finite() && bounds.hydro > 0.0);
        state.clock.dtcourant = bounds.courant;
        state.clock.dthydro = bounds.hydro;
    }
    assert!(state.elems.v.iter().all(|&v| v > 0.0));
}

#[test]
fn cycle_stats_count_chunks() {
    let mut state = sedov(3, 1, 1);
    let mut strategy = task_graph(4, 4, 4, 2);
    let dt = state.clock.deltatime;
    strategy.advance_cycle(&mut state, dt).unwrap();
    let stats = strategy.cycle_stats();
    assert_eq!(stats.phases.len(), 5);
    assert_eq!(stats.get(Phase::Force).unwrap().chunks, 7);
    assert_eq!(stats.get(Phase::Integrate).unwrap().chunks, 16);
    assert_eq!(stats.get(Phase::Kinematics).unwrap().chunks, 7);
    assert_eq!(stats.get(Phase::Material).unwrap().chunks, 7);
    assert_eq!(stats.get(Phase::Constraints).unwrap().chunks, 7);
}

#[test]
fn telemetry_events_per_cycle() {
    let sink = VecSink::new();
    let bus = EventBus::new().with_sink(Box::new(sink.shared()));
    let mut strategy = task_graph(8, 8, 8, 2).with_events(bus);
    let mut state = sedov(3, 2, 1);
    let dt = state.clock.deltatime;
    strategy.advance_cycle(&mut state, dt).unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 7);
    assert!(matches!(events[0].kind, EventKind::CycleBegin { .. }));
    let phases: Vec<String> = events[1..6]
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::PhaseComplete { phase, .. } => Some(phase.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec!["force", "integrate", "kinematics", "material", "constraints"]
    );
    assert!(matches!(events[6].kind, EventKind::CycleEnd { .. }));
}

#[test]
fn aborted_cycle_emits_event() {
    let sink = VecSink::new();
    let bus = EventBus::new().with_sink(Box::new(sink.shared()));
    let mut strategy = task_graph(2, 2, 2, 2).with_events(bus);
    let mut state = sedov(2, 1, 1);
    state.elems.q[0] = 1e13;
    assert!(strategy.advance_cycle(&mut state, 1e-12).is_err());

    let events = sink.events();
    let last = events.last().unwrap();
    assert!(matches!(last.kind, EventKind::CycleAborted { .. }));
}

// ─── Driver Tests ─────────────────────────────────────────────

#[test]
fn run_config_partial_toml() {
    let config = RunConfig::from_toml_str(
        r#"
max_cycles = 3

[mesh]
size = 4
num_regions = 2

[solver.task_sizes]
nodal = 8
elements = 16
constraints = 32
"#,
    )
    .unwrap();
    assert_eq!(config.max_cycles, 3);
    assert_eq!(config.mesh.size, 4);
    assert_eq!(config.mesh.cost, 1);
    assert_eq!(config.solver.task_sizes.elements, 16);
    assert_eq!(config.params, HydroParams::default());
}

#[test]
fn run_config_rejects_zero_task_size() {
    let err = RunConfig::from_toml_str("[solver.task_sizes]\nnodal = 0\n").unwrap_err();
    assert!(matches!(err, HydroError::InvalidConfig(_)));
}

#[test]
fn run_config_toml_roundtrip() {
    let config = RunConfig {
        max_cycles: 12,
        ..Default::default()
    };
    let text = config.to_toml_string().unwrap();
    assert_eq!(RunConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn simulation_stops_at_cycle_cap() {
    let config = RunConfig {
        max_cycles: 5,
        mesh: SedovConfig {
            size: 4,
            num_regions: 3,
            ..Default::default()
        },
        solver: SolverConfig {
            threads: 2,
            task_sizes: TaskSizes::uniform(8),
        },
        ..Default::default()
    };
    let mut sim = Simulation::from_config(&config).unwrap();
    let summary = sim.run().unwrap();
    assert_eq!(summary.cycles, 5);
    assert!(summary.time > 0.0);
    assert!(summary.origin_energy.is_finite() && summary.origin_energy > 0.0);
    assert_eq!(summary.strategy, "Task-Graph Leapfrog");
}

#[test]
fn simulation_matches_serial_reference() {
    let state = sedov(4, 3, 1);
    let mut parallel = Simulation::new(state.clone(), Box::new(task_graph(5, 5, 5, 3)), 8);
    let mut serial = Simulation::new(state, Box::new(SerialLeapfrog::new()), 8);
    parallel.run().unwrap();
    serial.run().unwrap();
    assert_same_state(&parallel.state, &serial.state);
}

#[test]
fn simulation_emits_run_summary() {
    let sink = VecSink::new();
    let strategy = task_graph(8, 8, 8, 2);
    let mut sim = Simulation::new(sedov(3, 2, 1), Box::new(strategy), 2)
        .with_events(EventBus::new().with_sink(Box::new(sink.shared())));
    assert_eq!(sim.num_threads(), 2);

    let summary = sim.run().unwrap();
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].cycle, 2);
    match &events[0].kind {
        EventKind::RunComplete {
            cycles,
            origin_energy,
            ..
        } => {
            assert_eq!(*cycles, summary.cycles);
            assert_eq!(*origin_energy, summary.origin_energy);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
