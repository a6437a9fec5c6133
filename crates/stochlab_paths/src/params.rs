//! Cox-Ingersoll-Ross (CIR) process parameters.
//!
//! The process is described by:
//! ```text
//! dv(t) = k * (theta - v(t)) * dt + q * sqrt(v(t)) * dW(t)
//! ```
//! where:
//! - v(t) = process value at time t (volatility-like, non-negative)
//! - k = mean reversion rate (must be positive)
//! - theta = long-run mean (must be non-negative)
//! - q = volatility coefficient (must be positive)
//! - dW(t) = Wiener process increment
//!
//! ## Feller Condition
//!
//! The continuous process stays strictly positive when
//! ```text
//! 2 * k * theta >= q^2
//! ```
//! If this condition is violated the process can touch zero, and the
//! discretised process relies on the full-truncation clamp.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use stochlab_core::types::error::{require_non_negative, require_positive};
use stochlab_core::LabResult;

/// CIR process parameters.
///
/// # Examples
///
/// ```
/// use stochlab_paths::CirParams;
///
/// let params = CirParams::new(10.0, 50.0, 1.0, 10.0).unwrap();
/// assert!(params.satisfies_feller());
///
/// // Invalid: non-positive mean reversion
/// assert!(CirParams::new(0.0, 50.0, 1.0, 10.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CirParams {
    /// Mean reversion rate `k` (> 0).
    pub mean_reversion: f64,
    /// Long-run mean `theta` (>= 0).
    pub long_term_mean: f64,
    /// Volatility coefficient `q` (> 0).
    pub volatility: f64,
    /// Initial value `v0` (>= 0).
    pub initial_value: f64,
}

impl CirParams {
    /// Creates validated CIR parameters.
    ///
    /// # Arguments
    ///
    /// * `mean_reversion` - `k`, must be positive
    /// * `long_term_mean` - `theta`, may be zero
    /// * `volatility` - `q`, must be positive
    /// * `initial_value` - `v0`, may be zero
    ///
    /// # Errors
    ///
    /// Returns `LabError::Configuration` naming the first offending
    /// parameter if a value is out of range or not finite.
    pub fn new(
        mean_reversion: f64,
        long_term_mean: f64,
        volatility: f64,
        initial_value: f64,
    ) -> LabResult<Self> {
        let params = Self {
            mean_reversion,
            long_term_mean,
            volatility,
            initial_value,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the parameter ranges.
    ///
    /// Fields are public, so the simulator re-validates before every run.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Configuration` for the first invalid field.
    pub fn validate(&self) -> LabResult<()> {
        require_positive("k", self.mean_reversion)?;
        require_non_negative("theta", self.long_term_mean)?;
        require_positive("q", self.volatility)?;
        require_non_negative("v0", self.initial_value)?;
        Ok(())
    }

    /// Checks if the Feller condition `2 k theta >= q^2` is satisfied.
    ///
    /// # Example
    ///
    /// ```
    /// use stochlab_paths::CirParams;
    ///
    /// // 2 * 10 * 50 = 1000 >= 1
    /// assert!(CirParams::new(10.0, 50.0, 1.0, 10.0).unwrap().satisfies_feller());
    ///
    /// // 2 * 0.5 * 0.1 = 0.1 < 4
    /// assert!(!CirParams::new(0.5, 0.1, 2.0, 0.1).unwrap().satisfies_feller());
    /// ```
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.mean_reversion * self.long_term_mean >= self.volatility * self.volatility
    }

    /// Feller ratio `2 k theta / q^2`; values >= 1.0 satisfy the condition.
    pub fn feller_ratio(&self) -> f64 {
        2.0 * self.mean_reversion * self.long_term_mean / (self.volatility * self.volatility)
    }
}

impl Default for CirParams {
    /// Reference experiment: `k = 10`, `theta = 50`, `q = 1`, `v0 = 10`.
    fn default() -> Self {
        Self {
            mean_reversion: 10.0,
            long_term_mean: 50.0,
            volatility: 1.0,
            initial_value: 10.0,
        }
    }
}
