//! stochlab CLI - Numerical Experiment Runner
//!
//! # Commands
//!
//! - `stochlab simulate` - Simulate CIR paths and compare the mean trajectory
//!   with the closed-form mean
//! - `stochlab variance` - Benchmark the fast, two-pass and online variance
//!   estimators across precisions
//!
//! Parameters come from flags, then the `--config` experiment file, then
//! the built-in reference experiment.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stochlab_cli::commands::{simulate, variance};
use stochlab_cli::config::{ExperimentConfig, LogLevel};
use stochlab_cli::{Result, VERSION};

/// stochlab numerical experiments CLI
#[derive(Parser)]
#[command(name = "stochlab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "STOCHLAB_LOG_LEVEL")]
    log_level: Option<String>,

    /// Experiment file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate CIR paths with the full-truncation Euler scheme
    Simulate(simulate::SimulateArgs),

    /// Compare variance estimators against a double-precision reference
    Variance(variance::VarianceArgs),
}

fn init_tracing(log_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let experiment = ExperimentConfig::load(cli.config.as_deref())?;

    let log_level = match &cli.log_level {
        Some(level) => LogLevel::from_str(level)?,
        None => experiment.log_level.unwrap_or_default(),
    };
    init_tracing(log_level);

    info!("stochlab v{}", VERSION);
    if let Some(path) = &cli.config {
        info!("Loaded experiment file: {}", path.display());
    }

    match cli.command {
        Commands::Simulate(args) => simulate::run(&args, &experiment.simulation),
        Commands::Variance(args) => variance::run(&args, &experiment.variance),
    }
}
