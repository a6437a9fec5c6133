//! Variance command implementation
//!
//! Runs the estimator benchmark and reports the relative error of every
//! method, precision and distribution.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use stochlab_core::rng::LabRng;
use stochlab_variance::{DistributionSpec, ErrorTable, VarianceBenchmark};

use crate::config::{OutputFormat, VarianceSection};
use crate::output::{format_error, render_table, write_csv, write_csv_file, write_json};
use crate::Result;

/// Flags of `stochlab variance`.
#[derive(Debug, Clone, Default, Args)]
pub struct VarianceArgs {
    /// Observations per batch
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Seed for the batches [default: 42]
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Output format (table, csv, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Output file for CSV / JSON (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl VarianceArgs {
    /// Overrides `section` with every flag that was given.
    pub fn apply(&self, section: &mut VarianceSection) {
        if let Some(sample_size) = self.sample_size {
            section.sample_size = sample_size;
        }
        if let Some(seed) = self.seed {
            section.seed = seed;
        }
    }
}

/// One exported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceRecord {
    /// Distribution label.
    pub distribution: String,
    /// Method display name.
    pub method: &'static str,
    /// Precision label (`float32` / `float64`).
    pub precision: &'static str,
    /// Double-precision two-pass reference.
    pub reference: f64,
    /// Computed variance.
    pub computed: f64,
    /// Relative error.
    pub relative_error: f64,
}

/// JSON document of one run.
#[derive(Debug, Clone, Serialize)]
pub struct VarianceReport {
    /// Seed of the batches.
    pub seed: u64,
    /// Observations per batch.
    pub sample_size: usize,
    /// Evaluated distributions.
    pub distributions: Vec<DistributionSpec>,
    /// Table rows.
    pub results: Vec<VarianceRecord>,
}

/// Run the variance command
pub fn run(args: &VarianceArgs, section: &VarianceSection) -> Result<()> {
    let mut section = section.clone();
    args.apply(&mut section);

    let config = section.benchmark_config()?;
    info!("Starting variance benchmark...");
    info!("  Sample size: {}", config.sample_size());
    info!("  Distributions: {}", config.distributions().len());
    info!("  Seed: {}", section.seed);

    let mut rng = LabRng::from_seed(section.seed);
    let benchmark = VarianceBenchmark::new(config);
    let table = benchmark.run(&mut rng)?;
    info!("Benchmark complete: {} results", table.len());

    let records = records(&table);
    match args.format {
        OutputFormat::Table => print_table(&table, benchmark.config().distributions()),
        OutputFormat::Csv => match &args.output {
            Some(path) => {
                write_csv_file(path, &records)?;
                info!("Wrote results to: {}", path.display());
            }
            None => write_csv(std::io::stdout().lock(), &records)?,
        },
        OutputFormat::Json => {
            let report = VarianceReport {
                seed: section.seed,
                sample_size: benchmark.config().sample_size(),
                distributions: benchmark.config().distributions().to_vec(),
                results: records,
            };
            write_json(&report, args.output.as_deref())?;
        }
    }

    Ok(())
}

/// Flattens the table into export rows, in table order.
pub fn records(table: &ErrorTable) -> Vec<VarianceRecord> {
    table
        .iter()
        .map(|row| VarianceRecord {
            distribution: row.label.to_string(),
            method: row.method.name(),
            precision: row.precision.label(),
            reference: row.reference,
            computed: row.entry.computed,
            relative_error: row.entry.relative_error,
        })
        .collect()
}

fn print_table(table: &ErrorTable, distributions: &[DistributionSpec]) {
    let rows: Vec<Vec<String>> = table
        .iter()
        .map(|row| {
            vec![
                row.label.to_string(),
                row.method.to_string(),
                row.precision.short_label().to_string(),
                format!("{:.6e}", row.entry.computed),
                format_error(row.entry.relative_error),
            ]
        })
        .collect();

    println!();
    print!(
        "{}",
        render_table(
            &["Distribution", "Method", "Precision", "Computed", "Relative error"],
            &rows
        )
    );
    for spec in distributions {
        if let Some(reference) = table.reference(spec.label()) {
            println!(
                "Reference variance [{}]: {:.6e} (|mean|/std = {:.1e})",
                spec.label(),
                reference,
                spec.offset_ratio()
            );
        }
    }
}
