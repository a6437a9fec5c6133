//! Population variance estimators.
//!
//! Three algorithms with one contract: given a non-empty sample in
//! precision `T`, return its population variance (divisor `n`) in `T`.
//!
//! | Method | Formula | Behaviour |
//! |--------|---------|-----------|
//! | Fast | `mean(x^2) - mean(x)^2` | one pass, cancels when `mean / std` is large |
//! | Two-pass | `mean((x - mean(x))^2)` | two passes, robust |
//! | Online | Welford recurrence | one streaming pass, robust |
//!
//! All accumulation happens in `T`; an `f32` sample is never widened.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use stochlab_core::math::summation::{mean, mean_of};
use stochlab_core::traits::Float;
use stochlab_core::{LabError, LabResult};

// ============================================================================
// Method enum
// ============================================================================

/// Variance estimation algorithm.
///
/// # Examples
///
/// ```
/// use stochlab_variance::VarianceMethod;
///
/// let data = [1.0_f64, 2.0, 3.0, 4.0];
/// for method in VarianceMethod::ALL {
///     assert_eq!(method.compute(&data).unwrap(), 1.25);
/// }
/// assert_eq!("two-pass".parse::<VarianceMethod>().unwrap(), VarianceMethod::TwoPass);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum VarianceMethod {
    /// Textbook one-pass formula `E[x^2] - E[x]^2`.
    Fast,
    /// Mean first, then mean of squared deviations.
    TwoPass,
    /// Welford's streaming recurrence.
    Online,
}

impl VarianceMethod {
    /// Every method, in display order.
    pub const ALL: [VarianceMethod; 3] = [
        VarianceMethod::Fast,
        VarianceMethod::TwoPass,
        VarianceMethod::Online,
    ];

    /// Display name (`Fast`, `Two-pass`, `Online`).
    pub fn name(&self) -> &'static str {
        match self {
            VarianceMethod::Fast => "Fast",
            VarianceMethod::TwoPass => "Two-pass",
            VarianceMethod::Online => "Online",
        }
    }

    /// Population variance of `data` in precision `T`.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::InvalidInput`] if `data` is empty.
    pub fn compute<T: Float>(&self, data: &[T]) -> LabResult<T> {
        match self {
            VarianceMethod::Fast => fast_variance(data),
            VarianceMethod::TwoPass => two_pass_variance(data),
            VarianceMethod::Online => online_variance(data),
        }
    }
}

impl fmt::Display for VarianceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VarianceMethod {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" | "naive" => Ok(VarianceMethod::Fast),
            "two-pass" | "two_pass" | "twopass" => Ok(VarianceMethod::TwoPass),
            "online" | "welford" => Ok(VarianceMethod::Online),
            _ => Err(LabError::configuration(
                "method",
                format!("'{}' is not one of fast, two-pass, online", s),
            )),
        }
    }
}

// ============================================================================
// Estimators
// ============================================================================

/// `mean(x^2) - mean(x)^2`.
///
/// The result is not clamped: under heavy cancellation it can be negative,
/// which is reported as is.
///
/// # Errors
///
/// Returns [`LabError::InvalidInput`] if `data` is empty.
pub fn fast_variance<T: Float>(data: &[T]) -> LabResult<T> {
    let mean_sq = mean_of(data, |x| x * x)?;
    let m = mean(data)?;
    Ok(mean_sq - m * m)
}

/// `mean((x - mean(x))^2)`.
///
/// # Errors
///
/// Returns [`LabError::InvalidInput`] if `data` is empty.
pub fn two_pass_variance<T: Float>(data: &[T]) -> LabResult<T> {
    let m = mean(data)?;
    mean_of(data, |x| (x - m) * (x - m))
}

/// Welford's recurrence, divided by `n`.
///
/// # Errors
///
/// Returns [`LabError::InvalidInput`] if `data` is empty.
pub fn online_variance<T: Float>(data: &[T]) -> LabResult<T> {
    if data.is_empty() {
        return Err(LabError::InvalidInput("sample is empty".to_string()));
    }
    let mut acc = OnlineVariance::new();
    acc.extend(data.iter().copied());
    acc.population_variance()
        .ok_or_else(|| LabError::InvalidInput("sample is empty".to_string()))
}

// ============================================================================
// Streaming accumulator
// ============================================================================

/// Streaming mean and variance accumulator (Welford).
///
/// Per observation `x` with running count `i`:
/// ```text
/// delta = x - M
/// M    += delta / i
/// S    += delta * (x - M)
/// ```
///
/// # Examples
///
/// ```
/// use stochlab_variance::OnlineVariance;
///
/// let mut acc = OnlineVariance::<f64>::new();
/// acc.extend([1.0, 2.0, 3.0, 4.0]);
///
/// assert_eq!(acc.count(), 4);
/// assert_eq!(acc.mean(), Some(2.5));
/// assert_eq!(acc.population_variance(), Some(1.25));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnlineVariance<T> {
    count: usize,
    // Running count in T, so the recurrence stays in the sample's precision
    n: T,
    mean: T,
    m2: T,
}

impl<T: Float> Default for OnlineVariance<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> OnlineVariance<T> {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            n: T::zero(),
            mean: T::zero(),
            m2: T::zero(),
        }
    }

    /// Adds one observation.
    #[inline]
    pub fn push(&mut self, x: T) {
        self.count += 1;
        self.n = self.n + T::one();
        let delta = x - self.mean;
        self.mean = self.mean + delta / self.n;
        self.m2 = self.m2 + delta * (x - self.mean);
    }

    /// Number of observations so far.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean, `None` before the first observation.
    pub fn mean(&self) -> Option<T> {
        (self.count > 0).then_some(self.mean)
    }

    /// Population variance `S / n`, `None` before the first observation.
    pub fn population_variance(&self) -> Option<T> {
        (self.count > 0).then(|| self.m2 / self.n)
    }

    /// Unbiased sample variance `S / (n - 1)`, `None` below two observations.
    pub fn sample_variance(&self) -> Option<T> {
        (self.count > 1).then(|| self.m2 / (self.n - T::one()))
    }
}

impl<T: Float> Extend<T> for OnlineVariance<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl<T: Float> FromIterator<T> for OnlineVariance<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}
