//! Pariksha - navigation benchmark runner
//!
//! Runs one trial of one scenario against a running simulator and controller
//! and appends the result to the result log.
//!
//! ```text
//! pariksha run --world-idx 3
//! pariksha run --world-idx 3 --out results/out.txt --config pariksha.toml
//! pariksha summary --out results/out.txt
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};

use pariksha::error::{BenchError, Result};
use pariksha::sim::{ControllerClient, PathStore, SimulationClient};
use pariksha::{BenchConfig, ResultLog, Summary, TrialRunner};

const DEFAULT_CONFIG: &str = "pariksha.toml";

#[derive(Parser)]
#[command(name = "pariksha")]
#[command(version, about = "Benchmark a navigation controller in simulation")]
struct Args {
    /// Configuration file (default: pariksha.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single trial and append its result
    Run {
        /// Scenario (world) index
        #[arg(long, default_value_t = 0)]
        world_idx: u32,

        /// Simulator was launched with a GUI
        #[arg(long)]
        gui: bool,

        /// Result log to append to
        #[arg(long)]
        out: Option<PathBuf>,

        /// Directory holding path_<idx>.npy reference paths
        #[arg(long)]
        paths: Option<PathBuf>,
    },

    /// Summarize an existing result log
    Summary {
        /// Result log to read
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, source) = load_config(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("pariksha={}", config.logging.level)
                    .parse::<tracing_subscriber::filter::Directive>()
                    .map_err(|e| BenchError::Config(format!("invalid log level: {}", e)))?,
            ),
        )
        .init();

    info!("Pariksha v{}", env!("CARGO_PKG_VERSION"));
    match source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("Using default configuration"),
    }

    let result = match args.command {
        Commands::Run {
            world_idx,
            gui,
            out,
            paths,
        } => {
            let mut config = config;
            if let Some(out) = out {
                config.output.results_path = out;
            }
            if let Some(paths) = paths {
                config.output.paths_dir = paths;
            }
            run_trial(&config, world_idx, gui)
        }
        Commands::Summary { out } => {
            let path = out.unwrap_or(config.output.results_path);
            summarize(&path)
        }
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

/// Explicit path, else pariksha.toml in the working directory, else defaults.
fn load_config(path: Option<&Path>) -> Result<(BenchConfig, Option<PathBuf>)> {
    if let Some(path) = path {
        return Ok((BenchConfig::load(path)?, Some(path.to_path_buf())));
    }
    let default = Path::new(DEFAULT_CONFIG);
    if default.exists() {
        return Ok((BenchConfig::load(default)?, Some(default.to_path_buf())));
    }
    Ok((BenchConfig::default(), None))
}

fn run_trial(config: &BenchConfig, world_idx: u32, gui: bool) -> Result<()> {
    info!(
        "Benchmarking BARN/world_{}.world (gui: {})",
        world_idx, gui
    );

    let timeout = config.connection.timeout();
    let paths = PathStore::new(&config.output.paths_dir);
    let mut sim = SimulationClient::connect(&config.connection.simulator_address, timeout, paths)?;
    let mut controller = ControllerClient::new(&config.connection.controller_address, timeout)?;
    let log = ResultLog::open(&config.output.results_path)?;

    let report = TrialRunner::new(config).run_and_record(world_idx, &mut sim, &mut controller, &log)?;

    println!("{}", report.record);
    Ok(())
}

fn summarize(path: &Path) -> Result<()> {
    let records = ResultLog::read_records(path)?;
    let summary = Summary::from_records(&records);
    info!("Read {} records from {}", records.len(), path.display());
    println!("{}", summary.report());
    Ok(())
}
