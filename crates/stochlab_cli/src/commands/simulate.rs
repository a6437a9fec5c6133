//! Simulate command implementation
//!
//! Runs the CIR Monte Carlo experiment and reports the ensemble mean
//! trajectory next to the closed-form mean.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::info;

use stochlab_paths::analytical::{cir_mean, cir_mean_trajectory};
use stochlab_paths::{CirParams, CirSimulation, CirSimulator};

use crate::config::{OutputFormat, SimulationSection};
use crate::output::{render_table, write_csv_file, write_json};
use crate::Result;

/// File name of the mean trajectory export.
pub const MEAN_TRAJECTORY_FILE: &str = "mean_trajectory.csv";

/// File name of the full path matrix export.
pub const PATHS_FILE: &str = "paths.csv";

/// File name of the JSON summary when written to a directory.
pub const SUMMARY_FILE: &str = "summary.json";

/// Flags of `stochlab simulate`. Unset flags fall back to the experiment
/// file, then to the reference experiment.
#[derive(Debug, Clone, Default, Args)]
pub struct SimulateArgs {
    /// Mean reversion rate k (> 0)
    #[arg(long)]
    pub k: Option<f64>,

    /// Long-run mean theta (>= 0)
    #[arg(long)]
    pub theta: Option<f64>,

    /// Volatility coefficient q (> 0)
    #[arg(long)]
    pub q: Option<f64>,

    /// Initial value v0 (>= 0)
    #[arg(long)]
    pub v0: Option<f64>,

    /// Horizon T
    #[arg(long)]
    pub horizon: Option<f64>,

    /// Step size dt
    #[arg(long)]
    pub dt: Option<f64>,

    /// Number of Monte Carlo paths
    #[arg(short, long)]
    pub n_paths: Option<usize>,

    /// Seed for reproducible runs
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Floor T / dt instead of requiring a whole number of steps
    #[arg(long)]
    pub truncate: bool,

    /// Sweep paths in parallel with one random stream per path
    #[arg(long)]
    pub parallel: bool,

    /// Output format (table, csv, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Output directory for CSV / JSON files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the full path matrix to paths.csv
    #[arg(long)]
    pub write_paths: bool,

    /// Number of time points shown in the table
    #[arg(long, default_value_t = 11)]
    pub rows: usize,
}

impl SimulateArgs {
    /// Overrides `section` with every flag that was given.
    pub fn apply(&self, section: &mut SimulationSection) {
        if let Some(k) = self.k {
            section.k = k;
        }
        if let Some(theta) = self.theta {
            section.theta = theta;
        }
        if let Some(q) = self.q {
            section.q = q;
        }
        if let Some(v0) = self.v0 {
            section.v0 = v0;
        }
        if let Some(horizon) = self.horizon {
            section.horizon = horizon;
        }
        if let Some(dt) = self.dt {
            section.dt = dt;
        }
        if let Some(n_paths) = self.n_paths {
            section.n_paths = n_paths;
        }
        if self.seed.is_some() {
            section.seed = self.seed;
        }
        section.truncate |= self.truncate;
        section.parallel |= self.parallel;
    }
}

/// One row of `mean_trajectory.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    /// Time.
    pub time: f64,
    /// Ensemble mean.
    pub mean: f64,
    /// Closed-form mean.
    pub analytical: f64,
}

/// JSON summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    /// Process parameters.
    pub params: CirParams,
    /// Whether `2 k theta >= q^2`.
    pub feller_satisfied: bool,
    /// Horizon covered by the grid.
    pub horizon: f64,
    /// Step size.
    pub dt: f64,
    /// Number of paths.
    pub n_paths: usize,
    /// Number of steps.
    pub n_steps: usize,
    /// Seed the run used.
    pub seed: Option<u64>,
    /// Sweep used (`sequential` or `parallel`).
    pub sweep: &'static str,
    /// Ensemble mean at the horizon.
    pub terminal_mean: f64,
    /// Standard error of the terminal mean.
    pub terminal_std_error: Option<f64>,
    /// Closed-form mean at the horizon.
    pub analytical_terminal_mean: f64,
    /// Sampled mean trajectory.
    pub trajectory: Vec<TrajectoryPoint>,
}

/// Run the simulate command
pub fn run(args: &SimulateArgs, section: &SimulationSection) -> Result<()> {
    let mut section = section.clone();
    args.apply(&mut section);

    let params = section.params()?;
    let config = section.simulation_config()?;
    info!("Starting CIR simulation...");
    info!(
        k = params.mean_reversion,
        theta = params.long_term_mean,
        q = params.volatility,
        v0 = params.initial_value,
        "  Process parameters"
    );
    info!(
        horizon = config.simulated_horizon(),
        dt = config.dt(),
        n_paths = config.n_paths(),
        n_steps = config.n_steps(),
        "  Simulation grid"
    );

    let simulator = CirSimulator::new(params, config);
    let (simulation, seed, sweep) = execute(&simulator, section.parallel)?;
    info!(
        terminal_mean = simulation.terminal_mean(),
        "Simulation complete"
    );

    let points = trajectory_points(&simulation, &params);
    let sampled = sample_points(&points, args.rows);

    match args.format {
        OutputFormat::Table => print_table(&simulation, &params, &sampled),
        OutputFormat::Csv => {
            let dir = output_dir(args.output.as_deref());
            let path = dir.join(MEAN_TRAJECTORY_FILE);
            write_csv_file(&path, &points)?;
            info!("Wrote mean trajectory to: {}", path.display());
        }
        OutputFormat::Json => {
            let config = simulator.config();
            let summary = SimulationSummary {
                params,
                feller_satisfied: params.satisfies_feller(),
                horizon: config.simulated_horizon(),
                dt: config.dt(),
                n_paths: config.n_paths(),
                n_steps: config.n_steps(),
                seed,
                sweep,
                terminal_mean: simulation.terminal_mean(),
                terminal_std_error: simulation.terminal_std_error(),
                analytical_terminal_mean: cir_mean(&params, config.simulated_horizon()),
                trajectory: sampled,
            };
            let path = args.output.as_deref().map(|dir| dir.join(SUMMARY_FILE));
            write_json(&summary, path.as_deref())?;
        }
    }

    if args.write_paths {
        let path = output_dir(args.output.as_deref()).join(PATHS_FILE);
        write_paths(&path, &simulation)?;
        info!("Wrote path matrix to: {}", path.display());
    }

    Ok(())
}

/// Runs the configured sweep; returns the result, the seed used and the
/// sweep name.
fn execute(
    simulator: &CirSimulator,
    parallel: bool,
) -> Result<(CirSimulation, Option<u64>, &'static str)> {
    let seed = simulator.config().seed();
    if parallel {
        run_parallel(simulator, seed)
    } else {
        Ok((simulator.simulate_seeded()?, seed, "sequential"))
    }
}

#[cfg(feature = "parallel")]
fn run_parallel(
    simulator: &CirSimulator,
    seed: Option<u64>,
) -> Result<(CirSimulation, Option<u64>, &'static str)> {
    // Per-path streams need a root seed
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "Using parallel sweep");
    Ok((simulator.simulate_parallel(seed)?, Some(seed), "parallel"))
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(
    _simulator: &CirSimulator,
    _seed: Option<u64>,
) -> Result<(CirSimulation, Option<u64>, &'static str)> {
    Err(crate::CliError::InvalidArgument(
        "--parallel requires the `parallel` feature".to_string(),
    ))
}

fn output_dir(output: Option<&Path>) -> PathBuf {
    output.map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Mean trajectory with the closed-form mean at every time point.
pub fn trajectory_points(simulation: &CirSimulation, params: &CirParams) -> Vec<TrajectoryPoint> {
    let grid = simulation.time_grid();
    let analytical = cir_mean_trajectory(params, &grid);
    grid.iter()
        .zip(simulation.mean_trajectory())
        .zip(analytical)
        .map(|((&time, &mean), analytical)| TrajectoryPoint {
            time,
            mean,
            analytical,
        })
        .collect()
}

/// Picks `count` evenly spaced points, always keeping the first and last.
pub fn sample_points(points: &[TrajectoryPoint], count: usize) -> Vec<TrajectoryPoint> {
    if points.is_empty() || count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![points[points.len() - 1]];
    }
    if count >= points.len() {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let mut indices: Vec<usize> = (0..count).map(|i| i * last / (count - 1)).collect();
    indices.dedup();
    indices.into_iter().map(|i| points[i]).collect()
}

fn print_table(simulation: &CirSimulation, params: &CirParams, sampled: &[TrajectoryPoint]) {
    let rows: Vec<Vec<String>> = sampled
        .iter()
        .map(|p| {
            vec![
                format!("{:.4}", p.time),
                format!("{:.6}", p.mean),
                format!("{:.6}", p.analytical),
                format!("{:+.6}", p.mean - p.analytical),
            ]
        })
        .collect();

    println!();
    print!(
        "{}",
        render_table(&["Time", "Simulated mean", "Analytical mean", "Difference"], &rows)
    );

    let (n_paths, n_cols) = simulation.ensemble().shape();
    println!("Paths x time points: {} x {}", n_paths, n_cols);
    match simulation.terminal_std_error() {
        Some(se) => println!(
            "Terminal mean: {:.6} ± {:.6} (1 s.e.)",
            simulation.terminal_mean(),
            se
        ),
        None => println!("Terminal mean: {:.6}", simulation.terminal_mean()),
    }
    if !params.satisfies_feller() {
        println!(
            "Feller condition violated (ratio {:.4}): paths can reach zero",
            params.feller_ratio()
        );
    }
}

/// Writes the path matrix: one row per path, one column per time point.
fn write_paths(path: &Path, simulation: &CirSimulation) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["path".to_string()];
    header.extend(simulation.time_grid().iter().map(|t| format!("t={}", t)));
    writer.write_record(&header)?;

    for (index, row) in simulation.ensemble().paths().enumerate() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(index.to_string());
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stochlab_core::rng::LabRng;
    use stochlab_paths::SimulationConfig;

    fn small_simulation() -> (CirSimulation, CirParams) {
        let params = CirParams::default();
        let config = SimulationConfig::builder()
            .horizon(1.0)
            .dt(0.1)
            .n_paths(5)
            .build()
            .unwrap();
        let sim = CirSimulator::new(params, config)
            .simulate(&mut LabRng::from_seed(1))
            .unwrap();
        (sim, params)
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let mut section = SimulationSection::default();
        let args = SimulateArgs {
            k: Some(2.0),
            n_paths: Some(10),
            seed: Some(5),
            truncate: true,
            ..SimulateArgs::default()
        };
        args.apply(&mut section);
        assert_eq!(section.k, 2.0);
        assert_eq!(section.theta, 50.0);
        assert_eq!(section.n_paths, 10);
        assert_eq!(section.seed, Some(5));
        assert!(section.truncate);
        assert!(!section.parallel);
    }

    #[test]
    fn test_trajectory_points() {
        let (sim, params) = small_simulation();
        let points = trajectory_points(&sim, &params);
        assert_eq!(points.len(), 11);
        assert_eq!(points[0].time, 0.0);
        assert_eq!(points[0].mean, 10.0);
        assert_eq!(points[0].analytical, 10.0);
        assert_eq!(points[10].time, 1.0);
    }

    #[test]
    fn test_sample_points() {
        let (sim, params) = small_simulation();
        let points = trajectory_points(&sim, &params);

        let sampled = sample_points(&points, 3);
        let times: Vec<f64> = sampled.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);

        assert_eq!(sample_points(&points, 100).len(), 11);
        assert_eq!(sample_points(&points, 1)[0].time, 1.0);
        assert!(sample_points(&points, 0).is_empty());
    }
}
