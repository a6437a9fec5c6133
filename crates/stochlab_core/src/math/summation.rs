//! Pairwise summation and means evaluated in the sample's own precision.
//!
//! Accumulation happens in `T`, never in a wider type, so a mean of an
//! `f32` sample carries `f32` rounding error. Pairwise summation keeps that
//! error at O(ε log n) instead of the O(ε n) of a running sum.

use crate::traits::Float;
use crate::types::{LabError, LabResult};

/// Block length below which a plain running sum is used.
pub const PAIRWISE_BLOCK: usize = 128;

/// Sums `data` by recursive halving down to blocks of [`PAIRWISE_BLOCK`].
///
/// Returns zero for an empty slice.
///
/// # Examples
/// ```
/// use stochlab_core::math::summation::pairwise_sum;
///
/// let values = vec![0.5_f32; 1000];
/// assert_eq!(pairwise_sum(&values), 500.0);
/// ```
pub fn pairwise_sum<T: Float>(data: &[T]) -> T {
    if data.len() <= PAIRWISE_BLOCK {
        return data.iter().fold(T::zero(), |acc, &x| acc + x);
    }
    let (left, right) = data.split_at(data.len() / 2);
    pairwise_sum(left) + pairwise_sum(right)
}

/// Converts a sample length to `T`.
///
/// # Errors
///
/// Returns [`LabError::InvalidInput`] if the length is not representable.
pub fn count_as<T: Float>(n: usize) -> LabResult<T> {
    T::from(n).ok_or_else(|| {
        LabError::InvalidInput(format!("sample length {} is not representable", n))
    })
}

/// Arithmetic mean in precision `T`.
///
/// # Errors
///
/// Returns [`LabError::InvalidInput`] if `data` is empty.
///
/// # Examples
/// ```
/// use stochlab_core::math::summation::mean;
///
/// assert_eq!(mean(&[1.0_f64, 2.0, 3.0, 4.0]).unwrap(), 2.5);
/// assert!(mean::<f64>(&[]).is_err());
/// ```
pub fn mean<T: Float>(data: &[T]) -> LabResult<T> {
    if data.is_empty() {
        return Err(LabError::InvalidInput("sample is empty".to_string()));
    }
    Ok(pairwise_sum(data) / count_as::<T>(data.len())?)
}

/// Arithmetic mean of `f(x)` over `data`, in precision `T`.
///
/// Materialises the mapped values so that they can be summed pairwise.
///
/// # Errors
///
/// Returns [`LabError::InvalidInput`] if `data` is empty.
pub fn mean_of<T: Float, F: Fn(T) -> T>(data: &[T], f: F) -> LabResult<T> {
    let mapped: Vec<T> = data.iter().map(|&x| f(x)).collect();
    mean(&mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pairwise_sum_small_and_empty() {
        assert_eq!(pairwise_sum::<f64>(&[]), 0.0);
        assert_eq!(pairwise_sum(&[1.0_f64, 2.0, 3.0]), 6.0);
    }

    #[test]
    fn test_pairwise_sum_matches_exact_integer_sum() {
        let values: Vec<f64> = (1..=10_000).map(|i| i as f64).collect();
        assert_eq!(pairwise_sum(&values), 50_005_000.0);
    }

    #[test]
    fn test_pairwise_beats_running_sum_in_single_precision() {
        let values = vec![0.1_f32; 1_000_000];
        let exact = 100_000.0_f64;

        let running = values.iter().fold(0.0_f32, |acc, &x| acc + x) as f64;
        let pairwise = pairwise_sum(&values) as f64;

        assert!((pairwise - exact).abs() < (running - exact).abs());
        assert_relative_eq!(pairwise, exact, max_relative = 1e-5);
    }

    #[test]
    fn test_mean_and_mean_of() {
        let data = [1.0_f32, 2.0, 3.0];
        assert_eq!(mean(&data).unwrap(), 2.0);
        assert_relative_eq!(mean_of(&data, |x| x * x).unwrap(), 14.0 / 3.0);
    }

    #[test]
    fn test_mean_empty_is_invalid_input() {
        assert!(mean::<f32>(&[]).unwrap_err().is_invalid_input());
        assert!(mean_of::<f64, _>(&[], |x| x).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_count_as() {
        assert_eq!(count_as::<f32>(1000).unwrap(), 1000.0);
        assert_eq!(count_as::<f64>(0).unwrap(), 0.0);
    }
}
