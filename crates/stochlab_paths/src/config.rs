//! Simulation configuration.
//!
//! This module provides [`SimulationConfig`] and its builder. The step count
//! is derived from the horizon and step size under an explicit
//! [`StepPolicy`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use stochlab_core::types::error::require_positive;
use stochlab_core::{LabError, LabResult};

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of time steps allowed per path.
pub const MAX_STEPS: usize = 10_000_000;

/// Maximum number of cells (`n_paths * (n_steps + 1)`) in one ensemble.
///
/// 500M `f64` values, i.e. 4 GB.
pub const MAX_ENSEMBLE_CELLS: usize = 500_000_000;

/// Relative tolerance for `horizon / dt` to count as a whole number.
pub const STEP_TOLERANCE: f64 = 1e-9;

/// How the step count is derived from `horizon / dt`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StepPolicy {
    /// `horizon / dt` must be a whole number (within [`STEP_TOLERANCE`]).
    ///
    /// The time grid then spans exactly `[0, horizon]`.
    #[default]
    Strict,

    /// `n_steps = floor(horizon / dt)`.
    ///
    /// The simulated horizon is `n_steps * dt`, which may fall short of the
    /// requested one.
    Truncate,
}

/// Monte Carlo simulation configuration.
///
/// Immutable and validated. Use [`SimulationConfigBuilder`] to construct
/// instances.
///
/// # Examples
///
/// ```rust
/// use stochlab_paths::SimulationConfig;
///
/// let config = SimulationConfig::builder()
///     .horizon(1.0)
///     .dt(0.0001)
///     .n_paths(1000)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_steps(), 10_000);
/// assert_eq!(config.n_paths(), 1000);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    horizon: f64,
    dt: f64,
    n_paths: usize,
    n_steps: usize,
    step_policy: StepPolicy,
    seed: Option<u64>,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Requested horizon `T`.
    #[inline]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Step size `dt`.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of simulation paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of time steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Step policy the step count was derived with.
    #[inline]
    pub fn step_policy(&self) -> StepPolicy {
        self.step_policy
    }

    /// Optional seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Horizon actually covered by the time grid.
    ///
    /// Equal to [`horizon`](Self::horizon) under [`StepPolicy::Strict`],
    /// `n_steps * dt` under [`StepPolicy::Truncate`].
    pub fn simulated_horizon(&self) -> f64 {
        match self.step_policy {
            StepPolicy::Strict => self.horizon,
            StepPolicy::Truncate => self.n_steps as f64 * self.dt,
        }
    }
}

/// Derives the step count from `horizon / dt` under `policy`.
///
/// # Errors
///
/// Returns `LabError::Configuration` if the ratio is not finite, smaller
/// than one step, above [`MAX_STEPS`], or (strict policy) not a whole
/// number.
pub fn resolve_step_count(horizon: f64, dt: f64, policy: StepPolicy) -> LabResult<usize> {
    let ratio = horizon / dt;
    if !ratio.is_finite() {
        return Err(LabError::configuration(
            "dt",
            format!("horizon / dt = {} is not finite", ratio),
        ));
    }

    let steps = match policy {
        StepPolicy::Strict => {
            let rounded = ratio.round();
            if (ratio - rounded).abs() > STEP_TOLERANCE * rounded.max(1.0) {
                return Err(LabError::configuration(
                    "dt",
                    format!(
                        "{} does not divide horizon {} into whole steps (ratio {})",
                        dt, horizon, ratio
                    ),
                ));
            }
            rounded
        }
        StepPolicy::Truncate => ratio.floor(),
    };

    if steps < 1.0 {
        return Err(LabError::configuration(
            "dt",
            format!("{} exceeds horizon {}: at least one step is required", dt, horizon),
        ));
    }
    if steps > MAX_STEPS as f64 {
        return Err(LabError::configuration(
            "n_steps",
            format!("{} exceeds the maximum of {}", steps, MAX_STEPS),
        ));
    }
    Ok(steps as usize)
}

/// Builder for [`SimulationConfig`].
///
/// Validation happens at [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    horizon: Option<f64>,
    dt: Option<f64>,
    n_paths: Option<usize>,
    step_policy: StepPolicy,
    seed: Option<u64>,
}

impl SimulationConfigBuilder {
    /// Sets the horizon `T` (> 0).
    #[inline]
    pub fn horizon(mut self, horizon: f64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Sets the step size `dt` (> 0).
    #[inline]
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Sets the number of paths in [1, [`MAX_PATHS`]].
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the step policy (default [`StepPolicy::Strict`]).
    #[inline]
    pub fn step_policy(mut self, step_policy: StepPolicy) -> Self {
        self.step_policy = step_policy;
        self
    }

    /// Sets the seed used by
    /// [`CirSimulator::simulate_seeded`](crate::CirSimulator::simulate_seeded).
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets or clears the seed.
    #[inline]
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Configuration` if:
    /// - `horizon`, `dt` or `n_paths` is not set
    /// - `horizon` or `dt` is not finite and positive
    /// - `n_paths` is 0 or greater than [`MAX_PATHS`]
    /// - the step count cannot be resolved (see [`resolve_step_count`])
    /// - the ensemble would exceed [`MAX_ENSEMBLE_CELLS`]
    pub fn build(self) -> LabResult<SimulationConfig> {
        let horizon = self
            .horizon
            .ok_or_else(|| LabError::configuration("horizon", "must be specified"))?;
        let dt = self
            .dt
            .ok_or_else(|| LabError::configuration("dt", "must be specified"))?;
        let n_paths = self
            .n_paths
            .ok_or_else(|| LabError::configuration("n_paths", "must be specified"))?;

        require_positive("horizon", horizon)?;
        require_positive("dt", dt)?;

        if n_paths == 0 || n_paths > MAX_PATHS {
            return Err(LabError::configuration(
                "n_paths",
                format!("{} must be in range [1, {}]", n_paths, MAX_PATHS),
            ));
        }

        let n_steps = resolve_step_count(horizon, dt, self.step_policy)?;

        let within_limit = n_paths
            .checked_mul(n_steps + 1)
            .is_some_and(|cells| cells <= MAX_ENSEMBLE_CELLS);
        if !within_limit {
            return Err(LabError::configuration(
                "n_paths",
                format!(
                    "{} paths x {} time points exceeds the ensemble limit of {} cells",
                    n_paths,
                    n_steps + 1,
                    MAX_ENSEMBLE_CELLS
                ),
            ));
        }

        Ok(SimulationConfig {
            horizon,
            dt,
            n_paths,
            n_steps,
            step_policy: self.step_policy,
            seed: self.seed,
        })
    }
}
