//! CLI command implementations.

use std::error::Error;
use std::path::Path;

use hexflow_bench::metrics::BenchmarkMetrics;
use hexflow_bench::report::FinalReport;
use hexflow_bench::runner::BenchmarkRunner;
use hexflow_bench::scenarios::{Scenario, ScenarioKind};
use hexflow_mesh::generators::sedov_cube_with;
use hexflow_solver::{LagrangeStrategy, RunConfig, Simulation, TaskGraphLeapfrog, TaskSizes};
use hexflow_telemetry::{EventBus, TracingSink};

use crate::RunArgs;

fn tracing_bus() -> EventBus {
    EventBus::new().with_sink(Box::new(TracingSink::new()))
}

/// Applies command-line overrides on top of the config file (or the
/// defaults). Without explicit task sizes or a config file, the chunk
/// sizes come from the per-size presets.
fn resolve_config(args: &RunArgs) -> Result<RunConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    if let Some(size) = args.size {
        config.mesh.size = size;
    }
    if let Some(iterations) = args.iterations {
        config.max_cycles = iterations;
    }
    if let Some(regions) = args.regions {
        config.mesh.num_regions = regions;
    }
    if let Some(balance) = args.balance {
        config.mesh.balance = balance;
    }
    if let Some(cost) = args.cost {
        config.mesh.cost = cost;
    }
    if let Some(threads) = args.threads {
        config.solver.threads = threads;
    }

    config.solver.task_sizes = match (&args.task_size, args.elems_per_task) {
        (Some(text), _) => TaskSizes::parse(text).map_err(|e| {
            format!(
                "Invalid argument for task size: {e}. Provide three comma-separated numbers, e.g. '--task-size 2048,4096,2048'"
            )
        })?,
        (None, Some(size)) => TaskSizes::uniform(size),
        (None, None) if args.config.is_none() => TaskSizes::for_problem_size(config.mesh.size),
        (None, None) => config.solver.task_sizes,
    };

    config.validate()?;
    Ok(config)
}

/// Run the Sedov problem and print the final report.
pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(args)?;
    let sizes = config.solver.task_sizes;
    let nx = config.mesh.size;

    let mut strategy = TaskGraphLeapfrog::new(config.solver)?;
    if args.events {
        strategy = strategy.with_events(tracing_bus());
    }
    let threads = strategy.num_threads();

    if !args.quiet {
        println!("Task size for nodal phases:      {}", sizes.nodal);
        println!("Task size for element phases:    {}", sizes.elements);
        println!("Task size for constraints phase: {}", sizes.constraints);
        println!("Running problem size {nx}^3 until completion");
        println!("Num threads: {threads}");
        println!("Total number of elements: {}", nx * nx * nx);
        println!();
        println!("To run other sizes, use -s <integer>.");
        println!("To run a fixed number of iterations, use -i <integer>.");
        println!("To run a more or less balanced region set, use -b <integer>.");
        println!("To change the relative costs of regions, use -c <integer>.");
        println!("To print out progress, use -p");
        println!("See help (-h) for more options");
        println!();
    }

    let state = sedov_cube_with(&config.mesh, config.params)?;
    let mut sim = Simulation::new(state, Box::new(strategy), config.max_cycles)
        .with_progress(args.progress && !args.quiet);
    if args.events {
        sim = sim.with_events(tracing_bus());
    }

    let summary = sim.run()?;
    let report = FinalReport::from_state(&sim.state, summary.elapsed).with_threads(threads);
    tracing::info!(
        size = report.size,
        cycles = report.cycles,
        threads,
        elapsed_s = report.elapsed,
        "Sedov run finished"
    );

    if args.quiet {
        println!("{}", report.to_csv_row());
    } else {
        println!("{report}");
        println!();
    }
    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    output_path: Option<&Path>,
    threads: Option<usize>,
    cycles: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    println!("hexflow Benchmark Suite");
    println!("═══════════════════════");
    println!();

    let kinds: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        match ScenarioKind::from_name(scenario_name) {
            Some(kind) => vec![kind],
            None => {
                let available: Vec<&str> =
                    ScenarioKind::all().iter().map(|k| k.name()).collect();
                return Err(format!(
                    "Unknown scenario: '{scenario_name}'. Available: {}, all",
                    available.join(", ")
                )
                .into());
            }
        }
    };

    let mut all_metrics = Vec::new();
    for kind in kinds {
        let mut scenario = Scenario::from_kind(kind);
        if let Some(threads) = threads {
            scenario = scenario.with_threads(threads);
        }
        if let Some(cycles) = cycles {
            scenario = scenario.with_max_cycles(cycles);
        }

        println!(
            "Running: {} ({}³ elements, {} regions, up to {} cycles)",
            kind.name(),
            scenario.mesh.size,
            scenario.mesh.num_regions,
            scenario.max_cycles,
        );

        let metrics = BenchmarkRunner::run_scenario(&scenario)
            .map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg cycle:     {:.3}ms", metrics.avg_cycle_time * 1000.0);
        println!("  Grind time:    {:.4}us/z/c", metrics.grind_time);
        println!("  Origin energy: {:.6e}", metrics.origin_energy);
        println!("  MaxRelDiff:    {:.3e}", metrics.max_rel_diff);
        println!();

        all_metrics.push(metrics);
    }

    match output_path {
        Some(path) => {
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let text = if is_json {
                BenchmarkMetrics::to_json(&all_metrics)?
            } else {
                BenchmarkMetrics::to_csv(&all_metrics)
            };
            std::fs::write(path, text)?;
            tracing::info!(
                path = %path.display(),
                scenarios = all_metrics.len(),
                "Benchmark results written"
            );
            println!("Results written to: {}", path.display());
        }
        None => {
            println!("CSV Output:");
            println!("{}", BenchmarkMetrics::to_csv(&all_metrics));
        }
    }

    Ok(())
}

/// Validate a run config.
pub fn validate(path: &Path) -> Result<(), Box<dyn Error>> {
    println!("hexflow Validator");
    println!("─────────────────");
    println!();

    if path.extension().map_or(true, |ext| ext != "toml") {
        return Err(format!(
            "Unsupported file type: {}. Expected a .toml run config.",
            path.display()
        )
        .into());
    }

    println!("Validating config: {}", path.display());
    let config = RunConfig::load(path)?;
    let state = sedov_cube_with(&config.mesh, config.params)?;
    state.validate()?;
    tracing::info!(path = %path.display(), elements = state.num_elem(), "Config validated");

    let sizes = config.solver.task_sizes;
    println!(
        "  Mesh:        {}³ elements, {} nodes",
        config.mesh.size,
        state.num_node()
    );
    println!(
        "  Regions:     {} (balance {}, cost {})",
        state.mesh.num_regions(),
        config.mesh.balance,
        config.mesh.cost
    );
    println!(
        "  Task sizes:  {},{},{}",
        sizes.nodal, sizes.elements, sizes.constraints
    );
    println!("  Stop time:   {:e}", config.params.stoptime);
    println!("  Cycle cap:   {}", config.max_cycles);
    println!("✅ Config is valid.");
    Ok(())
}
