//! Core types: error taxonomy and floating-point precision tags.

pub mod error;
pub mod precision;

pub use error::{LabError, LabResult};
pub use precision::Precision;
