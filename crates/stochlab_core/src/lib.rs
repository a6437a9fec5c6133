//! # stochlab_core: Foundation for the stochlab Experiments
//!
//! ## Foundation Role
//!
//! stochlab_core is the bottom layer shared by both numerical kernels:
//! - Error taxonomy: `LabError` (`types::error`)
//! - Floating-point precision tags: `Precision` (`types::precision`)
//! - Seeded random number generation: `LabRng` (`rng`)
//! - Precision-generic summation helpers (`math::summation`)
//!
//! ## Zero Dependency Principle
//!
//! This crate has no dependencies on other stochlab crates, with minimal
//! external dependencies:
//! - num-traits: `Float` abstraction over `f32` and `f64`
//! - rand / rand_distr: seeded PRNG and normal sampling
//! - thiserror: error derivation
//! - serde: serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use stochlab_core::math::summation::mean;
//! use stochlab_core::rng::LabRng;
//! use stochlab_core::types::Precision;
//!
//! let mut rng = LabRng::from_seed(42);
//! let mut buffer = vec![0.0; 256];
//! rng.fill_normal(&mut buffer);
//!
//! let single: Vec<f32> = Precision::downcast(&buffer).unwrap();
//! assert_eq!(single.len(), 256);
//! assert!(mean(&single).unwrap().is_finite());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `Precision`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod math;
pub mod rng;
pub mod traits;
pub mod types;

pub use types::{LabError, LabResult, Precision};
