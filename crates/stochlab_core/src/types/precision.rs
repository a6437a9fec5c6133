//! Floating-point precision tags.
//!
//! [`Precision`] names the precisions an experiment can be evaluated in and
//! provides the downcast from a double-precision sample batch.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::{LabError, LabResult};
use crate::traits::Float;

/// Floating-point precision of a computation.
///
/// # Examples
/// ```
/// use stochlab_core::types::Precision;
///
/// assert_eq!(Precision::Single.label(), "float32");
/// assert_eq!("f64".parse::<Precision>().unwrap(), Precision::Double);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Precision {
    /// IEEE 754 binary32 (`f32`).
    Single,
    /// IEEE 754 binary64 (`f64`).
    Double,
}

impl Precision {
    /// All supported precisions, lowest first.
    pub const ALL: [Precision; 2] = [Precision::Single, Precision::Double];

    /// Long label (`float32` / `float64`).
    pub fn label(&self) -> &'static str {
        match self {
            Precision::Single => "float32",
            Precision::Double => "float64",
        }
    }

    /// Short label (`f32` / `f64`).
    pub fn short_label(&self) -> &'static str {
        match self {
            Precision::Single => "f32",
            Precision::Double => "f64",
        }
    }

    /// Converts a double-precision batch to `T`, rounding to nearest.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::InvalidInput`] if a finite element lies outside
    /// the range of `T`.
    pub fn downcast<T: Float>(data: &[f64]) -> LabResult<Vec<T>> {
        data.iter()
            .enumerate()
            .map(|(i, &x)| {
                T::from(x).ok_or_else(|| {
                    LabError::InvalidInput(format!(
                        "element {} ({}) is not representable in the target precision",
                        i, x
                    ))
                })
            })
            .collect()
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Precision {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "float32" | "f32" => Ok(Precision::Single),
            "double" | "float64" | "f64" => Ok(Precision::Double),
            _ => Err(LabError::configuration(
                "precision",
                format!("unknown precision '{}': expected float32 or float64", s),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Precision::Single.label(), "float32");
        assert_eq!(Precision::Double.label(), "float64");
        assert_eq!(Precision::Single.short_label(), "f32");
        assert_eq!(Precision::Double.to_string(), "float64");
    }

    #[test]
    fn test_from_str() {
        for s in ["single", "float32", "F32"] {
            assert_eq!(s.parse::<Precision>().unwrap(), Precision::Single);
        }
        for s in ["double", "FLOAT64", "f64"] {
            assert_eq!(s.parse::<Precision>().unwrap(), Precision::Double);
        }
        assert!("f16".parse::<Precision>().unwrap_err().is_configuration());
    }

    #[test]
    fn test_downcast_single_rounds() {
        let data = [100.000_001_f64, 1.0, -2.5];
        let single: Vec<f32> = Precision::downcast(&data).unwrap();
        assert_eq!(single, vec![100.000_001_f64 as f32, 1.0, -2.5]);
        assert_ne!(single[0] as f64, data[0]);
    }

    #[test]
    fn test_downcast_double_is_identity() {
        let data = [0.1_f64, 1e-300, 7.25];
        let double: Vec<f64> = Precision::downcast(&data).unwrap();
        assert_eq!(double, data.to_vec());
    }

    #[test]
    fn test_downcast_out_of_range_is_rejected() {
        let result: LabResult<Vec<f32>> = Precision::downcast(&[1.0, 1e300]);
        let err = result.unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn test_ordering() {
        assert!(Precision::Single < Precision::Double);
    }
}
