//! hexflow CLI — Sedov runs, benchmarking, and config validation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "hexflow")]
#[command(version, about = "hexflow — task-graph Lagrangian hydro on hexahedral meshes")]
struct Cli {
    /// Log filter when RUST_LOG is unset (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Sedov problem to completion.
    Run(RunArgs),

    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (smoke, standard, imbalanced, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output file; `.json` writes JSON, anything else CSV.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (0 = all cores).
        #[arg(long)]
        threads: Option<usize>,

        /// Override every scenario's cycle cap.
        #[arg(long)]
        cycles: Option<u64>,
    },

    /// Validate a run config.
    Validate {
        /// Path to run config (TOML).
        path: PathBuf,
    },
}

/// Options of the `run` subcommand. Flags override the config file.
#[derive(Args)]
pub struct RunArgs {
    /// Run config (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Length of cube mesh along side.
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Number of cycles to run.
    #[arg(short, long)]
    pub iterations: Option<u64>,

    /// Number of distinct regions.
    #[arg(short, long)]
    pub regions: Option<usize>,

    /// Load balance between regions.
    #[arg(short, long)]
    pub balance: Option<u32>,

    /// Extra cost of more expensive regions.
    #[arg(short, long)]
    pub cost: Option<u32>,

    /// Print out progress.
    #[arg(short, long)]
    pub progress: bool,

    /// Quiet mode: print only the CSV summary line.
    #[arg(short, long)]
    pub quiet: bool,

    /// Task sizes for the nodal, element and constraint phases, e.g. `2048,4096,2048`.
    #[arg(long, conflicts_with = "elems_per_task")]
    pub task_size: Option<String>,

    /// One task size for every phase.
    #[arg(long)]
    pub elems_per_task: Option<usize>,

    /// Worker threads (0 = all cores).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Route per-cycle telemetry events to the log.
    #[arg(long)]
    pub events: bool,
}

fn init_logging(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)
}

fn main() {
    let cli = Cli::parse();

    let result = init_logging(&cli.log_level).and_then(|()| match cli.command {
        Commands::Run(args) => commands::run(&args),
        Commands::Benchmark {
            scenario,
            output,
            threads,
            cycles,
        } => commands::benchmark(&scenario, output.as_deref(), threads, cycles),
        Commands::Validate { path } => commands::validate(&path),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
