//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod simulate;
pub mod variance;
