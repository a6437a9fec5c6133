//! Error types for structured error handling.
//!
//! All stochlab computations are deterministic, so every error indicates a
//! caller-supplied problem and is returned immediately. There is no retry or
//! recovery logic anywhere in the kernels.
//!
//! # Variants
//! - `Configuration`: invalid or non-positive process/estimator parameters
//! - `NumericInstability`: non-finite value produced during simulation
//! - `InvalidInput`: empty or malformed sample passed to an estimator

use thiserror::Error;

/// Categorised stochlab errors.
///
/// # Examples
/// ```
/// use stochlab_core::types::LabError;
///
/// let err = LabError::configuration("dt", "must be positive, got 0");
/// assert_eq!(
///     format!("{}", err),
///     "Configuration error: parameter 'dt' must be positive, got 0"
/// );
///
/// let err = LabError::InvalidInput("sample is empty".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: sample is empty");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabError {
    /// Invalid or non-positive parameter.
    #[error("Configuration error: parameter '{name}' {reason}")]
    Configuration {
        /// Parameter name.
        name: &'static str,
        /// Description of the violated constraint.
        reason: String,
    },

    /// Non-finite value detected during simulation.
    #[error("Numeric instability at path {path}, step {step}: {quantity} = {value}")]
    NumericInstability {
        /// Path (row) index where the value was produced.
        path: usize,
        /// Time index of the value being computed.
        step: usize,
        /// Which term went non-finite (`drift`, `diffusion` or `value`).
        quantity: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Empty or malformed input sample.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LabError {
    /// Shorthand for a [`LabError::Configuration`] error.
    pub fn configuration(name: &'static str, reason: impl Into<String>) -> Self {
        LabError::Configuration {
            name,
            reason: reason.into(),
        }
    }

    /// Returns `true` for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, LabError::Configuration { .. })
    }

    /// Returns `true` for numeric instability errors.
    pub fn is_numeric_instability(&self) -> bool {
        matches!(self, LabError::NumericInstability { .. })
    }

    /// Returns `true` for invalid input errors.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LabError::InvalidInput(_))
    }
}

/// Result alias used throughout stochlab.
pub type LabResult<T> = Result<T, LabError>;

/// Validates that `value` is finite and strictly positive.
///
/// # Errors
///
/// Returns [`LabError::Configuration`] naming `name` otherwise.
pub fn require_positive(name: &'static str, value: f64) -> LabResult<f64> {
    if !value.is_finite() {
        return Err(LabError::configuration(
            name,
            format!("must be finite, got {}", value),
        ));
    }
    if value <= 0.0 {
        return Err(LabError::configuration(
            name,
            format!("must be positive, got {}", value),
        ));
    }
    Ok(value)
}

/// Validates that `value` is finite and non-negative.
///
/// # Errors
///
/// Returns [`LabError::Configuration`] naming `name` otherwise.
pub fn require_non_negative(name: &'static str, value: f64) -> LabResult<f64> {
    if !value.is_finite() {
        return Err(LabError::configuration(
            name,
            format!("must be finite, got {}", value),
        ));
    }
    if value < 0.0 {
        return Err(LabError::configuration(
            name,
            format!("must be non-negative, got {}", value),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = LabError::configuration("n_paths", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: parameter 'n_paths' must be at least 1"
        );
        assert!(err.is_configuration());
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_numeric_instability_display() {
        let err = LabError::NumericInstability {
            path: 3,
            step: 17,
            quantity: "drift",
            value: f64::INFINITY,
        };
        assert!(err.to_string().contains("path 3, step 17"));
        assert!(err.to_string().contains("drift = inf"));
        assert!(err.is_numeric_instability());
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("k", 2.5), Ok(2.5));
        assert!(require_positive("k", 0.0).unwrap_err().is_configuration());
        assert!(require_positive("k", -1.0).is_err());
        assert!(require_positive("k", f64::NAN).is_err());
        assert!(require_positive("k", f64::INFINITY).is_err());
    }

    #[test]
    fn test_require_non_negative() {
        assert_eq!(require_non_negative("theta", 0.0), Ok(0.0));
        assert!(require_non_negative("theta", -1e-12).is_err());
        assert!(require_non_negative("theta", f64::NAN).is_err());
    }

    #[test]
    fn test_error_names_parameter() {
        match require_positive("dt", -0.1) {
            Err(LabError::Configuration { name, reason }) => {
                assert_eq!(name, "dt");
                assert!(reason.contains("-0.1"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
