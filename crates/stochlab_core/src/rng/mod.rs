//! # Random Number Generation Infrastructure
//!
//! Random number generation for the stochlab kernels. Every simulation and
//! benchmark receives its random source explicitly, so a run is a pure
//! function of its inputs and seed.
//!
//! ## Design Rationale
//!
//! - **Reproducibility**: All generators support seeding for deterministic sequences
//! - **Explicit state**: No process-wide generator; callers own and pass `&mut LabRng`
//! - **Efficiency**: Zero-allocation batch operations via `&mut [f64]` slices
//! - **Independent streams**: [`LabRng::for_stream`] derives per-path generators
//!   for parallel sweeps
//!
//! ## Usage Example
//!
//! ```rust
//! use stochlab_core::rng::LabRng;
//!
//! // Create a seeded RNG for reproducible simulations
//! let mut rng = LabRng::from_seed(12345);
//!
//! // Standard normal variates (mean=0, std=1)
//! let normal_value = rng.gen_normal();
//!
//! // Batch generation into pre-allocated buffer (zero allocation)
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//!
//! // Gaussian sample with a given mean and standard deviation
//! rng.fill_normal_with(100.0, 0.01, &mut buffer).unwrap();
//! ```

mod prng;

pub use prng::{stream_seed, LabRng};

#[cfg(test)]
mod tests;
