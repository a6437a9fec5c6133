//! Gaussian sample distributions for the estimator benchmark.

#[cfg(feature = "serde")]
use serde::Serialize;

use stochlab_core::rng::LabRng;
use stochlab_core::types::error::require_positive;
use stochlab_core::{LabError, LabResult};

/// Normal distribution `N(mean, std^2)` with a display label.
///
/// The label identifies the distribution in an [`ErrorTable`](crate::ErrorTable)
/// and must be unique within one benchmark.
///
/// # Examples
///
/// ```
/// use stochlab_variance::DistributionSpec;
///
/// let spec = DistributionSpec::normal(100.0, 0.01).unwrap();
/// assert_eq!(spec.label(), "mean=100, std=0.01");
/// assert!(DistributionSpec::normal(1.0, 0.0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DistributionSpec {
    label: String,
    mean: f64,
    std: f64,
}

impl DistributionSpec {
    /// Creates a labelled distribution.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Configuration` if the label is blank, `mean` is
    /// not finite, or `std` is not finite and positive.
    pub fn new(label: impl Into<String>, mean: f64, std: f64) -> LabResult<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(LabError::configuration("label", "must not be empty"));
        }
        if !mean.is_finite() {
            return Err(LabError::configuration(
                "mean",
                format!("must be finite, got {}", mean),
            ));
        }
        require_positive("std", std)?;
        Ok(Self { label, mean, std })
    }

    /// Creates a distribution labelled `mean=<mean>, std=<std>`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn normal(mean: f64, std: f64) -> LabResult<Self> {
        Self::new(Self::default_label(mean, std), mean, std)
    }

    /// Unchecked constructor for the built-in reference distributions.
    pub(crate) fn reference(mean: f64, std: f64) -> Self {
        Self {
            label: Self::default_label(mean, std),
            mean,
            std,
        }
    }

    fn default_label(mean: f64, std: f64) -> String {
        format!("mean={}, std={}", mean, std)
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Distribution mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Standard deviation.
    pub fn std(&self) -> f64 {
        self.std
    }

    /// Ratio `|mean| / std`; the fast estimator loses about
    /// `2 log10(ratio)` significant digits.
    pub fn offset_ratio(&self) -> f64 {
        self.mean.abs() / self.std
    }

    /// Draws `len` double-precision observations.
    ///
    /// # Errors
    ///
    /// Propagates sampling errors from [`LabRng::normal_sample`].
    pub fn sample(&self, rng: &mut LabRng, len: usize) -> LabResult<Vec<f64>> {
        rng.normal_sample(self.mean, self.std, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        assert_eq!(DistributionSpec::normal(1.0, 1.0).unwrap().label(), "mean=1, std=1");
        assert_eq!(
            DistributionSpec::normal(10.0, 0.1).unwrap().label(),
            "mean=10, std=0.1"
        );
        assert_eq!(DistributionSpec::reference(-2.5, 3.0).label(), "mean=-2.5, std=3");
    }

    #[test]
    fn test_validation() {
        assert!(DistributionSpec::new("", 0.0, 1.0).unwrap_err().is_configuration());
        assert!(DistributionSpec::new("x", f64::NAN, 1.0).is_err());
        assert!(DistributionSpec::new("x", 0.0, -1.0).is_err());
        assert!(DistributionSpec::new("x", 0.0, f64::INFINITY).is_err());
        assert!(matches!(
            DistributionSpec::normal(0.0, 0.0),
            Err(LabError::Configuration { name: "std", .. })
        ));
    }

    #[test]
    fn test_accessors_and_ratio() {
        let spec = DistributionSpec::new("custom", -100.0, 0.01).unwrap();
        assert_eq!(spec.label(), "custom");
        assert_eq!(spec.mean(), -100.0);
        assert_eq!(spec.std(), 0.01);
        assert!((spec.offset_ratio() - 1e4).abs() < 1e-8);
    }

    #[test]
    fn test_sample_is_seeded() {
        let spec = DistributionSpec::normal(10.0, 0.1).unwrap();
        let a = spec.sample(&mut LabRng::from_seed(42), 100).unwrap();
        let b = spec.sample(&mut LabRng::from_seed(42), 100).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        assert!(a.iter().all(|x| (x - 10.0).abs() < 1.0));
    }
}
