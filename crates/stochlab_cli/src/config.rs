//! Experiment configuration management
//!
//! Handles loading experiment parameters from a TOML file. Values are
//! resolved with the priority: CLI flags, then the experiment file, then
//! the built-in reference experiment.
//!
//! # File Format
//!
//! ```toml
//! log_level = "info"
//!
//! [simulation]
//! k = 10.0
//! theta = 50.0
//! q = 1.0
//! v0 = 10.0
//! horizon = 1.0
//! dt = 0.0001
//! n_paths = 1000
//! seed = 7
//!
//! [variance]
//! sample_size = 1000
//! seed = 42
//! methods = ["fast", "two-pass", "online"]
//! precisions = ["float32", "float64"]
//!
//! [[variance.distributions]]
//! mean = 100.0
//! std = 0.01
//! ```

use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

use stochlab_core::types::Precision;
use stochlab_paths::{CirParams, SimulationConfig, StepPolicy};
use stochlab_variance::{BenchmarkConfig, DistributionSpec, VarianceMethod};

use crate::error::{CliError, Result};

// ============================================================================
// Log level and output format
// ============================================================================

/// Log levels accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything, including per-run tracing.
    Trace,
    /// Kernel start/finish events.
    Debug,
    /// Command progress.
    #[default]
    Info,
    /// Feller violations and other warnings.
    Warn,
    /// Errors only.
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

fn deserialize_log_level<'de, D>(deserializer: D) -> std::result::Result<Option<LogLevel>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// Output format of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Box-drawn table on stdout.
    #[default]
    Table,
    /// CSV files (simulate) or CSV rows (variance).
    Csv,
    /// Pretty-printed JSON document.
    Json,
}

// ============================================================================
// Experiment file
// ============================================================================

/// Contents of an experiment file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Log level, overridden by `--log-level`.
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: Option<LogLevel>,
    /// `[simulation]` table.
    pub simulation: SimulationSection,
    /// `[variance]` table.
    pub variance: VarianceSection,
}

impl ExperimentConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` if given, otherwise the reference experiment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// `[simulation]` table: CIR parameters and grid.
///
/// Defaults reproduce the reference experiment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Mean reversion rate.
    pub k: f64,
    /// Long-run mean.
    pub theta: f64,
    /// Volatility coefficient.
    pub q: f64,
    /// Initial value.
    pub v0: f64,
    /// Horizon `T`.
    pub horizon: f64,
    /// Step size.
    pub dt: f64,
    /// Number of paths.
    pub n_paths: usize,
    /// Seed; OS entropy when absent.
    pub seed: Option<u64>,
    /// Floor `T / dt` instead of requiring a whole number of steps.
    pub truncate: bool,
    /// Rayon sweep with per-path streams.
    pub parallel: bool,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let params = CirParams::default();
        Self {
            k: params.mean_reversion,
            theta: params.long_term_mean,
            q: params.volatility,
            v0: params.initial_value,
            horizon: 1.0,
            dt: 1e-4,
            n_paths: 1000,
            seed: None,
            truncate: false,
            parallel: false,
        }
    }
}

impl SimulationSection {
    /// Validated process parameters.
    pub fn params(&self) -> Result<CirParams> {
        Ok(CirParams::new(self.k, self.theta, self.q, self.v0)?)
    }

    /// Validated simulation configuration.
    pub fn simulation_config(&self) -> Result<SimulationConfig> {
        let policy = if self.truncate {
            StepPolicy::Truncate
        } else {
            StepPolicy::Strict
        };
        Ok(SimulationConfig::builder()
            .horizon(self.horizon)
            .dt(self.dt)
            .n_paths(self.n_paths)
            .step_policy(policy)
            .maybe_seed(self.seed)
            .build()?)
    }
}

/// One `[[variance.distributions]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributionEntry {
    /// Optional label; defaults to `mean=<mean>, std=<std>`.
    #[serde(default)]
    pub label: Option<String>,
    /// Mean.
    pub mean: f64,
    /// Standard deviation.
    pub std: f64,
}

impl DistributionEntry {
    fn to_spec(&self) -> Result<DistributionSpec> {
        let spec = match &self.label {
            Some(label) => DistributionSpec::new(label.clone(), self.mean, self.std)?,
            None => DistributionSpec::normal(self.mean, self.std)?,
        };
        Ok(spec)
    }
}

/// `[variance]` table.
///
/// Without distributions the three reference distributions are used.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VarianceSection {
    /// Observations per batch.
    pub sample_size: usize,
    /// Seed for the batches.
    pub seed: u64,
    /// Method names; all methods when absent.
    pub methods: Option<Vec<String>>,
    /// Precision names; both precisions when absent.
    pub precisions: Option<Vec<String>>,
    /// Custom distributions.
    pub distributions: Vec<DistributionEntry>,
}

impl Default for VarianceSection {
    fn default() -> Self {
        Self {
            sample_size: stochlab_variance::benchmark::DEFAULT_SAMPLE_SIZE,
            seed: 42,
            methods: None,
            precisions: None,
            distributions: Vec::new(),
        }
    }
}

impl VarianceSection {
    /// Validated benchmark configuration.
    pub fn benchmark_config(&self) -> Result<BenchmarkConfig> {
        let distributions = if self.distributions.is_empty() {
            BenchmarkConfig::standard().distributions().to_vec()
        } else {
            self.distributions
                .iter()
                .map(DistributionEntry::to_spec)
                .collect::<Result<Vec<_>>>()?
        };

        let mut builder = BenchmarkConfig::builder()
            .sample_size(self.sample_size)
            .distributions(distributions);

        if let Some(names) = &self.methods {
            let methods = names
                .iter()
                .map(|name| VarianceMethod::from_str(name))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            builder = builder.methods(methods);
        }
        if let Some(names) = &self.precisions {
            let precisions = names
                .iter()
                .map(|name| Precision::from_str(name))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            builder = builder.precisions(precisions);
        }

        Ok(builder.build()?)
    }
}
