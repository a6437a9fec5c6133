//! Numeric abstractions shared by the kernels.

/// Generic floating-point trait for precision-generic computations.
///
/// Re-exported from `num-traits` so that estimators can be written once and
/// evaluated in both `f32` and `f64`.
///
/// # Examples
/// ```
/// use stochlab_core::traits::Float;
///
/// fn squared_deviation<T: Float>(x: T, mean: T) -> T {
///     (x - mean) * (x - mean)
/// }
///
/// assert_eq!(squared_deviation(3.0_f32, 1.0), 4.0);
/// assert_eq!(squared_deviation(3.0_f64, 1.0), 4.0);
/// ```
pub use num_traits::Float;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_trait_with_both_precisions() {
        fn generic_sqrt<T: Float>(x: T) -> T {
            x.sqrt()
        }

        assert_eq!(generic_sqrt(4.0_f64), 2.0);
        assert_eq!(generic_sqrt(4.0_f32), 2.0);
    }
}
