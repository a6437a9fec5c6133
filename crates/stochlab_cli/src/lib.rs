//! stochlab command-line runner
//!
//! Library half of the `stochlab` binary: experiment file loading, command
//! implementations and output rendering.

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use error::{CliError, Result};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
