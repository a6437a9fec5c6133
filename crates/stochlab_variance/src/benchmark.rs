//! Relative-error benchmark of the variance estimators.
//!
//! # Protocol
//!
//! For every distribution, in configuration order:
//! 1. draw one double-precision batch of `sample_size` observations
//! 2. compute the reference: two-pass variance of the `f64` batch
//! 3. for every precision, downcast the batch once, then for every method
//!    compute the variance and record `|computed - reference| / reference`
//!
//! The reference is never computed at reduced precision, so the recorded
//! error includes the rounding of the downcast itself. An estimator that
//! overflows is recorded with its non-finite value and an infinite error;
//! the rest of the table is still evaluated.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, warn};

use stochlab_core::rng::LabRng;
use stochlab_core::traits::Float;
use stochlab_core::types::Precision;
use stochlab_core::{LabError, LabResult};

use crate::distribution::DistributionSpec;
use crate::estimators::{two_pass_variance, VarianceMethod};

/// Default number of observations per batch.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Relative error `|computed - reference| / reference`.
///
/// A non-finite `computed` value (an estimator that overflowed) has an
/// infinite relative error.
///
/// # Errors
///
/// Returns `LabError::InvalidInput` if `reference` is zero or not finite.
///
/// # Examples
///
/// ```
/// use stochlab_variance::relative_error;
///
/// assert_eq!(relative_error(1.5, 2.0).unwrap(), 0.25);
/// assert_eq!(relative_error(f64::NAN, 2.0).unwrap(), f64::INFINITY);
/// assert!(relative_error(1.0, 0.0).is_err());
/// ```
pub fn relative_error(computed: f64, reference: f64) -> LabResult<f64> {
    if !reference.is_finite() || reference == 0.0 {
        return Err(LabError::InvalidInput(format!(
            "reference variance {} cannot normalise an error",
            reference
        )));
    }
    if !computed.is_finite() {
        return Ok(f64::INFINITY);
    }
    Ok((computed - reference).abs() / reference.abs())
}

// ============================================================================
// Configuration
// ============================================================================

/// Benchmark configuration.
///
/// Use [`BenchmarkConfig::standard`] for the reference experiment or
/// [`BenchmarkConfig::builder`] for a custom one.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkConfig {
    sample_size: usize,
    distributions: Vec<DistributionSpec>,
    methods: Vec<VarianceMethod>,
    precisions: Vec<Precision>,
}

impl BenchmarkConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> BenchmarkConfigBuilder {
        BenchmarkConfigBuilder::default()
    }

    /// Reference experiment: `N(1, 1)`, `N(10, 0.1)` and `N(100, 0.01)`,
    /// 1000 observations each, every method in both precisions.
    pub fn standard() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            distributions: vec![
                DistributionSpec::reference(1.0, 1.0),
                DistributionSpec::reference(10.0, 0.1),
                DistributionSpec::reference(100.0, 0.01),
            ],
            methods: VarianceMethod::ALL.to_vec(),
            precisions: Precision::ALL.to_vec(),
        }
    }

    /// The standard experiment with a different batch size.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Configuration` if `sample_size` is 0.
    pub fn standard_with_sample_size(sample_size: usize) -> LabResult<Self> {
        let standard = Self::standard();
        Self::builder()
            .sample_size(sample_size)
            .distributions(standard.distributions)
            .build()
    }

    /// Observations per batch.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Distributions, in evaluation order.
    pub fn distributions(&self) -> &[DistributionSpec] {
        &self.distributions
    }

    /// Methods to evaluate.
    pub fn methods(&self) -> &[VarianceMethod] {
        &self.methods
    }

    /// Precisions to evaluate.
    pub fn precisions(&self) -> &[Precision] {
        &self.precisions
    }

    /// Number of table entries a run produces.
    pub fn result_count(&self) -> usize {
        self.distributions.len() * self.methods.len() * self.precisions.len()
    }
}

/// Builder for [`BenchmarkConfig`].
///
/// Methods and precisions default to all of them; the sample size defaults
/// to [`DEFAULT_SAMPLE_SIZE`]. At least one distribution is required.
#[derive(Clone, Debug, Default)]
pub struct BenchmarkConfigBuilder {
    sample_size: Option<usize>,
    distributions: Vec<DistributionSpec>,
    methods: Option<Vec<VarianceMethod>>,
    precisions: Option<Vec<Precision>>,
}

impl BenchmarkConfigBuilder {
    /// Sets the batch size (>= 1).
    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Appends one distribution.
    pub fn distribution(mut self, distribution: DistributionSpec) -> Self {
        self.distributions.push(distribution);
        self
    }

    /// Appends several distributions.
    pub fn distributions(
        mut self,
        distributions: impl IntoIterator<Item = DistributionSpec>,
    ) -> Self {
        self.distributions.extend(distributions);
        self
    }

    /// Replaces the method list.
    pub fn methods(mut self, methods: impl IntoIterator<Item = VarianceMethod>) -> Self {
        self.methods = Some(methods.into_iter().collect());
        self
    }

    /// Replaces the precision list.
    pub fn precisions(mut self, precisions: impl IntoIterator<Item = Precision>) -> Self {
        self.precisions = Some(precisions.into_iter().collect());
        self
    }

    /// Builds the configuration.
    ///
    /// Duplicate methods or precisions are dropped, keeping the first
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Configuration` if the sample size is 0, any list
    /// is empty, or two distributions share a label.
    pub fn build(self) -> LabResult<BenchmarkConfig> {
        let sample_size = self.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE);
        if sample_size == 0 {
            return Err(LabError::configuration("sample_size", "must be at least 1"));
        }

        if self.distributions.is_empty() {
            return Err(LabError::configuration(
                "distributions",
                "at least one distribution is required",
            ));
        }
        for (i, spec) in self.distributions.iter().enumerate() {
            if self.distributions[..i].iter().any(|d| d.label() == spec.label()) {
                return Err(LabError::configuration(
                    "distributions",
                    format!("label '{}' is used more than once", spec.label()),
                ));
            }
        }

        let methods = dedup(self.methods.unwrap_or_else(|| VarianceMethod::ALL.to_vec()));
        if methods.is_empty() {
            return Err(LabError::configuration(
                "methods",
                "at least one method is required",
            ));
        }

        let precisions = dedup(self.precisions.unwrap_or_else(|| Precision::ALL.to_vec()));
        if precisions.is_empty() {
            return Err(LabError::configuration(
                "precisions",
                "at least one precision is required",
            ));
        }

        Ok(BenchmarkConfig {
            sample_size,
            distributions: self.distributions,
            methods,
            precisions,
        })
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

// ============================================================================
// Results
// ============================================================================

/// Computed variance and its relative error for one method and precision.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ErrorEntry {
    /// Variance returned by the estimator, widened to `f64`.
    pub computed: f64,
    /// `|computed - reference| / reference`, infinite when `computed` is
    /// not finite.
    pub relative_error: f64,
}

impl ErrorEntry {
    /// True if the estimator returned a finite value.
    pub fn is_finite(&self) -> bool {
        self.computed.is_finite()
    }
}

/// Results for one distribution.
#[derive(Clone, Debug, PartialEq)]
struct DistributionResult {
    label: String,
    reference: f64,
    entries: BTreeMap<(VarianceMethod, Precision), ErrorEntry>,
}

/// One row of an [`ErrorTable`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ErrorRow<'a> {
    /// Distribution label.
    pub label: &'a str,
    /// Estimator.
    pub method: VarianceMethod,
    /// Evaluation precision.
    pub precision: Precision,
    /// Double-precision two-pass reference of the batch.
    pub reference: f64,
    /// Computed value and relative error.
    pub entry: ErrorEntry,
}

/// Relative errors keyed by `(distribution, method, precision)`.
///
/// Distributions keep their configuration order; within a distribution,
/// entries are ordered by method then precision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorTable {
    distributions: Vec<DistributionResult>,
}

impl ErrorTable {
    fn find(&self, label: &str) -> Option<&DistributionResult> {
        self.distributions.iter().find(|d| d.label == label)
    }

    /// Relative error for one combination.
    pub fn get(&self, label: &str, method: VarianceMethod, precision: Precision) -> Option<f64> {
        self.entry(label, method, precision)
            .map(|entry| entry.relative_error)
    }

    /// Computed value and relative error for one combination.
    pub fn entry(
        &self,
        label: &str,
        method: VarianceMethod,
        precision: Precision,
    ) -> Option<ErrorEntry> {
        self.find(label)?.entries.get(&(method, precision)).copied()
    }

    /// Reference variance of a distribution's batch.
    pub fn reference(&self, label: &str) -> Option<f64> {
        self.find(label).map(|d| d.reference)
    }

    /// Distribution labels in evaluation order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.distributions.iter().map(|d| d.label.as_str())
    }

    /// Every row in table order.
    pub fn iter(&self) -> impl Iterator<Item = ErrorRow<'_>> + '_ {
        self.distributions.iter().flat_map(|d| {
            d.entries
                .iter()
                .map(move |(&(method, precision), &entry)| ErrorRow {
                    label: &d.label,
                    method,
                    precision,
                    reference: d.reference,
                    entry,
                })
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.distributions.iter().map(|d| d.entries.len()).sum()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest relative error of a method over all distributions and
    /// precisions.
    pub fn worst_error(&self, method: VarianceMethod) -> Option<f64> {
        self.iter()
            .filter(|row| row.method == method)
            .map(|row| row.entry.relative_error)
            .reduce(f64::max)
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Runs the estimator benchmark.
///
/// # Examples
///
/// ```
/// use stochlab_core::rng::LabRng;
/// use stochlab_core::types::Precision;
/// use stochlab_variance::{BenchmarkConfig, VarianceBenchmark, VarianceMethod};
///
/// let table = VarianceBenchmark::new(BenchmarkConfig::standard())
///     .run(&mut LabRng::from_seed(42))
///     .unwrap();
///
/// assert_eq!(table.len(), 18);
/// let label = "mean=100, std=0.01";
/// let fast = table.get(label, VarianceMethod::Fast, Precision::Single).unwrap();
/// let robust = table.get(label, VarianceMethod::TwoPass, Precision::Single).unwrap();
/// assert!(fast > robust);
/// ```
#[derive(Clone, Debug)]
pub struct VarianceBenchmark {
    config: BenchmarkConfig,
}

impl VarianceBenchmark {
    /// Creates a benchmark for `config`.
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// Benchmark configuration.
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Draws every batch from `rng` and evaluates every combination.
    ///
    /// # Errors
    ///
    /// Aborts on the first error:
    /// - `LabError::InvalidInput` if a batch has zero or non-finite variance
    /// - `LabError::InvalidInput` if a batch cannot be downcast
    ///
    /// A non-finite estimator result is not an error; see [`ErrorEntry`].
    pub fn run(&self, rng: &mut LabRng) -> LabResult<ErrorTable> {
        debug!(
            sample_size = self.config.sample_size,
            distributions = self.config.distributions.len(),
            entries = self.config.result_count(),
            seed = ?rng.seed(),
            "Starting variance benchmark"
        );

        let mut distributions = Vec::with_capacity(self.config.distributions.len());
        for spec in &self.config.distributions {
            let result = self.evaluate_distribution(spec, rng)?;
            distributions.push(result);
        }

        Ok(ErrorTable { distributions })
    }

    fn evaluate_distribution(
        &self,
        spec: &DistributionSpec,
        rng: &mut LabRng,
    ) -> LabResult<DistributionResult> {
        let batch = spec.sample(rng, self.config.sample_size)?;
        let reference = two_pass_variance(&batch)?;
        if reference == 0.0 || !reference.is_finite() {
            return Err(LabError::InvalidInput(format!(
                "batch for '{}' has variance {}",
                spec.label(),
                reference
            )));
        }

        let mut entries = BTreeMap::new();
        for &precision in &self.config.precisions {
            let computed = match precision {
                Precision::Single => {
                    let single: Vec<f32> = Precision::downcast(&batch)?;
                    evaluate_methods(&self.config.methods, &single)?
                }
                Precision::Double => evaluate_methods(&self.config.methods, &batch)?,
            };
            for (method, value) in computed {
                let entry = ErrorEntry {
                    computed: value,
                    relative_error: relative_error(value, reference)?,
                };
                if !entry.is_finite() {
                    warn!(
                        label = spec.label(),
                        method = method.name(),
                        precision = precision.label(),
                        computed = value,
                        "Estimator result is not finite"
                    );
                }
                entries.insert((method, precision), entry);
            }
        }

        debug!(
            label = spec.label(),
            reference,
            "Evaluated distribution"
        );

        Ok(DistributionResult {
            label: spec.label().to_string(),
            reference,
            entries,
        })
    }
}

/// Runs every method on one precision's copy of the batch.
fn evaluate_methods<T: Float>(
    methods: &[VarianceMethod],
    data: &[T],
) -> LabResult<Vec<(VarianceMethod, f64)>> {
    methods
        .iter()
        .map(|&method| {
            let value = method.compute(data)?;
            let widened = value.to_f64().ok_or_else(|| {
                LabError::InvalidInput(format!("{} result is not representable as f64", method))
            })?;
            Ok((method, widened))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_relative_error() {
        assert_relative_eq!(relative_error(1.1, 1.0).unwrap(), 0.1, epsilon = 1e-12);
        assert_eq!(relative_error(2.0, 2.0).unwrap(), 0.0);
        // Negative fast results are valid input
        assert_eq!(relative_error(-1.0, 1.0).unwrap(), 2.0);
        assert!(relative_error(1.0, 0.0).unwrap_err().is_invalid_input());
        assert!(relative_error(1.0, f64::NAN).is_err());
        assert_eq!(relative_error(f64::INFINITY, 1.0).unwrap(), f64::INFINITY);
        assert_eq!(relative_error(f64::NAN, 1.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_standard_config() {
        let config = BenchmarkConfig::standard();
        assert_eq!(config.sample_size(), 1000);
        let labels: Vec<&str> = config.distributions().iter().map(|d| d.label()).collect();
        assert_eq!(
            labels,
            ["mean=1, std=1", "mean=10, std=0.1", "mean=100, std=0.01"]
        );
        assert_eq!(config.methods(), &VarianceMethod::ALL);
        assert_eq!(config.precisions(), &Precision::ALL);
        assert_eq!(config.result_count(), 18);
    }

    #[test]
    fn test_builder_defaults_and_validation() {
        let spec = DistributionSpec::normal(0.0, 1.0).unwrap();
        let config = BenchmarkConfig::builder()
            .distribution(spec.clone())
            .build()
            .unwrap();
        assert_eq!(config.sample_size(), DEFAULT_SAMPLE_SIZE);
        assert_eq!(config.result_count(), 6);

        let err = BenchmarkConfig::builder()
            .sample_size(0)
            .distribution(spec.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, LabError::Configuration { name: "sample_size", .. }));

        assert!(BenchmarkConfig::builder().build().is_err());
        assert!(BenchmarkConfig::builder()
            .distribution(spec.clone())
            .methods(Vec::new())
            .build()
            .is_err());
        assert!(BenchmarkConfig::builder()
            .distribution(spec.clone())
            .precisions(Vec::new())
            .build()
            .is_err());

        let err = BenchmarkConfig::builder()
            .distribution(spec.clone())
            .distribution(spec)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_builder_dedups_lists() {
        let config = BenchmarkConfig::builder()
            .distribution(DistributionSpec::normal(0.0, 1.0).unwrap())
            .methods([VarianceMethod::Online, VarianceMethod::Fast, VarianceMethod::Online])
            .precisions([Precision::Double, Precision::Double])
            .build()
            .unwrap();
        assert_eq!(config.methods(), &[VarianceMethod::Online, VarianceMethod::Fast]);
        assert_eq!(config.precisions(), &[Precision::Double]);
    }

    #[test]
    fn test_standard_with_sample_size() {
        let config = BenchmarkConfig::standard_with_sample_size(50).unwrap();
        assert_eq!(config.sample_size(), 50);
        assert_eq!(config.distributions().len(), 3);
        assert!(BenchmarkConfig::standard_with_sample_size(0).is_err());
    }

    #[test]
    fn test_single_observation_batch_is_rejected() {
        let config = BenchmarkConfig::builder()
            .sample_size(1)
            .distribution(DistributionSpec::normal(0.0, 1.0).unwrap())
            .build()
            .unwrap();
        let err = VarianceBenchmark::new(config)
            .run(&mut LabRng::from_seed(1))
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_table_accessors() {
        let config = BenchmarkConfig::builder()
            .sample_size(64)
            .distribution(DistributionSpec::new("a", 0.0, 1.0).unwrap())
            .distribution(DistributionSpec::new("b", 5.0, 2.0).unwrap())
            .methods([VarianceMethod::TwoPass])
            .precisions([Precision::Double])
            .build()
            .unwrap();
        let table = VarianceBenchmark::new(config)
            .run(&mut LabRng::from_seed(5))
            .unwrap();

        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
        assert_eq!(table.labels().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(table.get("a", VarianceMethod::TwoPass, Precision::Double), Some(0.0));
        assert_eq!(table.get("a", VarianceMethod::Fast, Precision::Double), None);
        assert_eq!(table.get("c", VarianceMethod::TwoPass, Precision::Double), None);

        let entry = table
            .entry("b", VarianceMethod::TwoPass, Precision::Double)
            .unwrap();
        assert_eq!(Some(entry.computed), table.reference("b"));

        let rows: Vec<_> = table.iter().collect();
        assert_eq!(rows[0].label, "a");
        assert_eq!(rows[1].label, "b");
        assert_eq!(table.worst_error(VarianceMethod::TwoPass), Some(0.0));
        assert_eq!(table.worst_error(VarianceMethod::Online), None);
    }
}
