//! CLI error types.

use stochlab_core::LabError;
use thiserror::Error;

/// Errors surfaced by the `stochlab` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error raised by a numerical kernel.
    #[error(transparent)]
    Lab(#[from] LabError),

    /// Invalid command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid log level string.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Experiment file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Experiment file could not be parsed.
    #[error("Configuration file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON export error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
