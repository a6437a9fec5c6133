//! Euler-Maruyama simulation of the CIR process.
//!
//! # Scheme
//!
//! Per step `t -> t+1`, identically and independently for every path:
//! ```text
//! dW      = sqrt(dt) * Z,          Z ~ N(0, 1)
//! v_prev  = max(v[t], 0)           (full truncation)
//! v[t+1]  = max(v_prev + k (theta - v_prev) dt + q sqrt(v_prev) dW, 0)
//! ```
//!
//! # Random Streams
//!
//! [`CirSimulator::simulate`] sweeps column by column and draws one batch of
//! `n_paths` normals per step from a single injected generator.
//! [`CirSimulator::simulate_streams`] (and `simulate_parallel` with the
//! `parallel` feature) sweep path by path with one derived stream per path,
//! so their output does not depend on scheduling. The two draw orders give
//! different, equally distributed, ensembles.

use stochlab_core::rng::LabRng;
use stochlab_core::{LabError, LabResult};
use tracing::{debug, warn};

use crate::config::SimulationConfig;
use crate::ensemble::PathEnsemble;
use crate::params::CirParams;

/// Advances one path value by one full-truncation Euler step.
///
/// `dw` is the Wiener increment (already scaled by `sqrt(dt)`); `path` and
/// `step` only label a possible error. `step` is the time index being
/// produced.
///
/// # Errors
///
/// Returns [`LabError::NumericInstability`] if the drift, the diffusion or
/// the new value is not finite.
///
/// # Examples
///
/// ```rust
/// use stochlab_paths::{euler_full_truncation_step, CirParams};
///
/// let params = CirParams::new(2.0, 1.0, 0.5, 0.0).unwrap();
///
/// // From zero only the drift acts: 2 * (1 - 0) * 0.1 = 0.2
/// let v = euler_full_truncation_step(&params, 0.0, 0.1, -3.0, 0, 1).unwrap();
/// assert!((v - 0.2).abs() < 1e-15);
///
/// // Negative inputs are truncated before use
/// let w = euler_full_truncation_step(&params, -5.0, 0.1, -3.0, 0, 1).unwrap();
/// assert_eq!(v, w);
/// ```
#[inline]
pub fn euler_full_truncation_step(
    params: &CirParams,
    v_prev: f64,
    dt: f64,
    dw: f64,
    path: usize,
    step: usize,
) -> LabResult<f64> {
    let v_pos = v_prev.max(0.0);

    let drift = params.mean_reversion * (params.long_term_mean - v_pos) * dt;
    if !drift.is_finite() {
        return Err(instability(path, step, "drift", drift));
    }

    let diffusion = params.volatility * v_pos.sqrt() * dw;
    if !diffusion.is_finite() {
        return Err(instability(path, step, "diffusion", diffusion));
    }

    let v_new = v_pos + drift + diffusion;
    if !v_new.is_finite() {
        return Err(instability(path, step, "value", v_new));
    }

    Ok(v_new.max(0.0))
}

#[inline]
fn instability(path: usize, step: usize, quantity: &'static str, value: f64) -> LabError {
    LabError::NumericInstability {
        path,
        step,
        quantity,
        value,
    }
}

/// Evolves one trajectory in place, drawing from its own generator.
///
/// `row[0]` must already hold the initial value.
fn evolve_row(
    params: &CirParams,
    row: &mut [f64],
    dt: f64,
    rng: &mut LabRng,
    path: usize,
) -> LabResult<()> {
    let sqrt_dt = dt.sqrt();
    for step in 1..row.len() {
        let dw = sqrt_dt * rng.gen_normal();
        row[step] = euler_full_truncation_step(params, row[step - 1], dt, dw, path, step)?;
    }
    Ok(())
}

/// Result of one simulation run: the path matrix and its mean trajectory.
#[derive(Clone, Debug, PartialEq)]
pub struct CirSimulation {
    ensemble: PathEnsemble,
    mean_trajectory: Vec<f64>,
}

impl CirSimulation {
    /// Aggregates a filled ensemble.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::NumericInstability`] with quantity `mean` for the
    /// first column whose average is not finite; `path` then holds the
    /// number of paths averaged.
    fn new(ensemble: PathEnsemble) -> LabResult<Self> {
        let mean_trajectory = ensemble.mean_trajectory();
        if let Some((step, &value)) = mean_trajectory
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(instability(ensemble.n_paths(), step, "mean", value));
        }
        Ok(Self {
            ensemble,
            mean_trajectory,
        })
    }

    /// The path matrix `V[p, t]`.
    #[inline]
    pub fn ensemble(&self) -> &PathEnsemble {
        &self.ensemble
    }

    /// Column-wise ensemble average, one value per time point.
    #[inline]
    pub fn mean_trajectory(&self) -> &[f64] {
        &self.mean_trajectory
    }

    /// Time grid matching the ensemble columns.
    pub fn time_grid(&self) -> Vec<f64> {
        self.ensemble.time_grid()
    }

    /// Ensemble mean at the final time point.
    pub fn terminal_mean(&self) -> f64 {
        self.mean_trajectory[self.ensemble.n_steps()]
    }

    /// Standard error of [`terminal_mean`](Self::terminal_mean).
    ///
    /// Uses the unbiased sample variance; `None` for a single path.
    /// Deviations are scaled by the largest one before squaring, so the
    /// result stays finite for terminal values near `f64::MAX`.
    pub fn terminal_std_error(&self) -> Option<f64> {
        let n = self.ensemble.n_paths();
        if n < 2 {
            return None;
        }
        let mean = self.terminal_mean();
        let terminal = self.ensemble.n_steps();
        let scale = self
            .ensemble
            .column(terminal)
            .map(|v| (v - mean).abs())
            .fold(0.0, f64::max);
        if scale == 0.0 {
            return Some(0.0);
        }
        let sum_sq: f64 = self
            .ensemble
            .column(terminal)
            .map(|v| {
                let d = (v - mean) / scale;
                d * d
            })
            .sum();
        let variance = sum_sq / (n - 1) as f64;
        Some(scale * (variance / n as f64).sqrt())
    }
}

/// Monte Carlo simulator for the CIR process.
///
/// # Examples
///
/// ```rust
/// use stochlab_core::rng::LabRng;
/// use stochlab_paths::{CirParams, CirSimulator, SimulationConfig};
///
/// let config = SimulationConfig::builder()
///     .horizon(0.5)
///     .dt(0.01)
///     .n_paths(64)
///     .seed(7)
///     .build()
///     .unwrap();
/// let simulator = CirSimulator::new(CirParams::default(), config);
///
/// let a = simulator.simulate_seeded().unwrap();
/// let b = simulator.simulate(&mut LabRng::from_seed(7)).unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Debug)]
pub struct CirSimulator {
    params: CirParams,
    config: SimulationConfig,
}

impl CirSimulator {
    /// Creates a simulator for `params` under `config`.
    pub fn new(params: CirParams, config: SimulationConfig) -> Self {
        Self { params, config }
    }

    /// Process parameters.
    #[inline]
    pub fn params(&self) -> &CirParams {
        &self.params
    }

    /// Simulation configuration.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn prepare(&self) -> LabResult<Vec<f64>> {
        self.params.validate()?;
        if !self.params.satisfies_feller() {
            warn!(
                feller_ratio = self.params.feller_ratio(),
                "Feller condition violated: paths can reach zero and rely on truncation"
            );
        }
        let width = self.config.n_steps() + 1;
        let mut values = vec![0.0; self.config.n_paths() * width];
        for row in values.chunks_exact_mut(width) {
            row[0] = self.params.initial_value;
        }
        Ok(values)
    }

    fn finish(&self, values: Vec<f64>) -> LabResult<CirSimulation> {
        let ensemble = PathEnsemble::from_values(
            values,
            self.config.n_paths(),
            self.config.n_steps(),
            self.config.simulated_horizon(),
        );
        let simulation = CirSimulation::new(ensemble)?;
        debug!(
            terminal_mean = simulation.terminal_mean(),
            "CIR simulation complete"
        );
        Ok(simulation)
    }

    /// Runs the column-by-column sweep with an injected generator.
    ///
    /// At every step one standard normal is drawn per path, in path order.
    ///
    /// # Errors
    ///
    /// - `LabError::Configuration` if the parameters are invalid
    /// - `LabError::NumericInstability` on the first non-finite value, or if
    ///   a column average is not finite
    pub fn simulate(&self, rng: &mut LabRng) -> LabResult<CirSimulation> {
        let n_paths = self.config.n_paths();
        let n_steps = self.config.n_steps();
        let dt = self.config.dt();
        debug!(
            n_paths,
            n_steps,
            dt,
            seed = ?rng.seed(),
            "Starting CIR simulation"
        );

        let mut values = self.prepare()?;
        let width = n_steps + 1;
        let sqrt_dt = dt.sqrt();

        // Scratch buffer hoisted out of the time loop
        let mut increments = vec![0.0; n_paths];

        for step in 1..=n_steps {
            rng.fill_normal(&mut increments);
            for (path, &z) in increments.iter().enumerate() {
                let idx = path * width + step;
                values[idx] = euler_full_truncation_step(
                    &self.params,
                    values[idx - 1],
                    dt,
                    sqrt_dt * z,
                    path,
                    step,
                )?;
            }
        }

        self.finish(values)
    }

    /// Runs [`simulate`](Self::simulate) with the configured seed.
    ///
    /// Without a configured seed the generator is drawn from OS entropy and
    /// results differ from run to run.
    ///
    /// # Errors
    ///
    /// See [`simulate`](Self::simulate).
    pub fn simulate_seeded(&self) -> LabResult<CirSimulation> {
        let mut rng = LabRng::from_optional_seed(self.config.seed());
        self.simulate(&mut rng)
    }

    /// Runs a path-by-path sweep where path `p` draws from
    /// `LabRng::for_stream(seed, p)`.
    ///
    /// # Errors
    ///
    /// See [`simulate`](Self::simulate).
    pub fn simulate_streams(&self, seed: u64) -> LabResult<CirSimulation> {
        debug!(
            n_paths = self.config.n_paths(),
            n_steps = self.config.n_steps(),
            seed,
            "Starting per-path stream CIR simulation"
        );
        let mut values = self.prepare()?;
        let width = self.config.n_steps() + 1;
        for (path, row) in values.chunks_exact_mut(width).enumerate() {
            let mut rng = LabRng::for_stream(seed, path as u64);
            evolve_row(&self.params, row, self.config.dt(), &mut rng, path)?;
        }
        self.finish(values)
    }

    /// Parallel version of [`simulate_streams`](Self::simulate_streams).
    ///
    /// Produces bit-identical output for any thread count. When several
    /// paths fail, which error is returned is unspecified.
    ///
    /// # Errors
    ///
    /// See [`simulate`](Self::simulate).
    #[cfg(feature = "parallel")]
    pub fn simulate_parallel(&self, seed: u64) -> LabResult<CirSimulation> {
        use rayon::prelude::*;

        debug!(
            n_paths = self.config.n_paths(),
            n_steps = self.config.n_steps(),
            seed,
            threads = rayon::current_num_threads(),
            "Starting parallel CIR simulation"
        );
        let mut values = self.prepare()?;
        let width = self.config.n_steps() + 1;
        let dt = self.config.dt();
        values
            .par_chunks_exact_mut(width)
            .enumerate()
            .try_for_each(|(path, row)| {
                let mut rng = LabRng::for_stream(seed, path as u64);
                evolve_row(&self.params, row, dt, &mut rng, path)
            })?;
        self.finish(values)
    }
}
