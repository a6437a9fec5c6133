//! # stochlab_variance: Variance Estimator Bank
//!
//! Three population variance algorithms with one contract, and a benchmark
//! that measures how far each one drifts from a double-precision reference
//! as the ratio `mean / std` grows and the precision drops.
//!
//! This crate provides:
//! - The estimators as a closed strategy enum ([`VarianceMethod`]) and as
//!   free functions ([`fast_variance`], [`two_pass_variance`],
//!   [`online_variance`])
//! - A streaming Welford accumulator ([`OnlineVariance`])
//! - Gaussian sample distributions ([`DistributionSpec`])
//! - The relative-error benchmark ([`BenchmarkConfig`], [`VarianceBenchmark`],
//!   [`ErrorTable`])
//!
//! ## Usage Example
//!
//! ```rust
//! use stochlab_core::rng::LabRng;
//! use stochlab_core::types::Precision;
//! use stochlab_variance::{BenchmarkConfig, VarianceBenchmark, VarianceMethod};
//!
//! let mut rng = LabRng::from_seed(42);
//! let table = VarianceBenchmark::new(BenchmarkConfig::standard())
//!     .run(&mut rng)
//!     .unwrap();
//!
//! for row in table.iter() {
//!     assert!(row.entry.relative_error.is_finite());
//! }
//! let label = "mean=1, std=1";
//! assert_eq!(table.get(label, VarianceMethod::TwoPass, Precision::Double), Some(0.0));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialisation for methods, distributions and table rows

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod benchmark;
pub mod distribution;
pub mod estimators;

pub use benchmark::{
    relative_error, BenchmarkConfig, BenchmarkConfigBuilder, ErrorEntry, ErrorRow, ErrorTable,
    VarianceBenchmark,
};
pub use distribution::DistributionSpec;
pub use estimators::{
    fast_variance, online_variance, two_pass_variance, OnlineVariance, VarianceMethod,
};
