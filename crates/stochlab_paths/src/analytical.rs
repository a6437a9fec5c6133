//! Closed-form moments of the CIR process.
//!
//! Used to check the convergence of the simulated mean trajectory:
//! ```text
//! E[v(t)]   = theta + (v0 - theta) e^{-k t}
//! Var[v(t)] = v0 q^2 / k (e^{-k t} - e^{-2 k t}) + theta q^2 / (2 k) (1 - e^{-k t})^2
//! ```

use crate::params::CirParams;

/// Expected value of `v(t)`.
///
/// # Examples
///
/// ```
/// use stochlab_paths::analytical::cir_mean;
/// use stochlab_paths::CirParams;
///
/// let params = CirParams::default();
/// assert_eq!(cir_mean(&params, 0.0), 10.0);
/// assert!((cir_mean(&params, 10.0) - 50.0).abs() < 1e-9);
/// ```
pub fn cir_mean(params: &CirParams, t: f64) -> f64 {
    let decay = (-params.mean_reversion * t).exp();
    params.long_term_mean + (params.initial_value - params.long_term_mean) * decay
}

/// Variance of `v(t)`.
pub fn cir_variance(params: &CirParams, t: f64) -> f64 {
    let k = params.mean_reversion;
    let q2 = params.volatility * params.volatility;
    let decay = (-k * t).exp();
    params.initial_value * q2 / k * (decay - decay * decay)
        + params.long_term_mean * q2 / (2.0 * k) * (1.0 - decay) * (1.0 - decay)
}

/// Expected values on a time grid.
pub fn cir_mean_trajectory(params: &CirParams, time_grid: &[f64]) -> Vec<f64> {
    time_grid.iter().map(|&t| cir_mean(params, t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_at_origin_and_limit() {
        let p = CirParams::default();
        assert_eq!(cir_mean(&p, 0.0), p.initial_value);
        assert_relative_eq!(cir_mean(&p, 100.0), p.long_term_mean, max_relative = 1e-12);
    }

    #[test]
    fn test_mean_reference_horizon() {
        // 50 - 40 e^{-10}
        let p = CirParams::default();
        assert_relative_eq!(
            cir_mean(&p, 1.0),
            50.0 - 40.0 * (-10.0_f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_variance_limits() {
        let p = CirParams::default();
        assert_eq!(cir_variance(&p, 0.0), 0.0);
        // Stationary variance theta q^2 / (2 k) = 50 * 1 / 20
        assert_relative_eq!(cir_variance(&p, 50.0), 2.5, max_relative = 1e-12);
    }

    #[test]
    fn test_mean_trajectory_on_grid() {
        let p = CirParams::default();
        let grid = [0.0, 0.1, 0.2];
        let traj = cir_mean_trajectory(&p, &grid);
        assert_eq!(traj.len(), 3);
        assert!(traj.windows(2).all(|w| w[1] > w[0]));
    }
}
