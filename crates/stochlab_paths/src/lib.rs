//! # stochlab_paths: CIR Path Simulator
//!
//! Monte Carlo engine for the mean-reverting square-root diffusion
//!
//! ```text
//! dv = k (theta - v) dt + q sqrt(v) dW
//! ```
//!
//! discretised with an explicit Euler-Maruyama scheme and the full-truncation
//! fix, over an ensemble of independent paths.
//!
//! This crate provides:
//! - Validated process parameters ([`CirParams`])
//! - Simulation configuration with an explicit step-count policy ([`SimulationConfig`])
//! - The column-by-column simulation sweep ([`CirSimulator`])
//! - The path matrix and its aggregates ([`PathEnsemble`], [`CirSimulation`])
//! - Closed-form CIR moments for convergence checks ([`analytical`])
//!
//! ## Usage Example
//!
//! ```rust
//! use stochlab_core::rng::LabRng;
//! use stochlab_paths::{CirParams, CirSimulator, SimulationConfig};
//!
//! let params = CirParams::new(10.0, 50.0, 1.0, 10.0).unwrap();
//! let config = SimulationConfig::builder()
//!     .horizon(1.0)
//!     .dt(0.01)
//!     .n_paths(200)
//!     .build()
//!     .unwrap();
//!
//! let mut rng = LabRng::from_seed(42);
//! let simulation = CirSimulator::new(params, config).simulate(&mut rng).unwrap();
//!
//! assert_eq!(simulation.ensemble().shape(), (200, 101));
//! assert!(simulation.ensemble().values().iter().all(|&v| v >= 0.0));
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: rayon-parallel sweep, one independent random stream per path
//! - `serde`: serialisation for `CirParams` and `StepPolicy`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod analytical;
pub mod config;
pub mod ensemble;
pub mod params;
pub mod simulator;

pub use config::{SimulationConfig, SimulationConfigBuilder, StepPolicy};
pub use ensemble::PathEnsemble;
pub use params::CirParams;
pub use simulator::{euler_full_truncation_step, CirSimulation, CirSimulator};
