//! Path ensemble storage and aggregation.
//!
//! # Memory Layout
//!
//! Paths are stored row-major in one contiguous buffer:
//! `values[path_idx * (n_steps + 1) + step_idx]`, where `step_idx = 0`
//! holds the initial value. One row is one trajectory, one column one time
//! point.

/// Matrix of simulated path values, shape `(n_paths, n_steps + 1)`.
///
/// Constructed by the simulator and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct PathEnsemble {
    values: Vec<f64>,
    n_paths: usize,
    n_steps: usize,
    horizon: f64,
}

impl PathEnsemble {
    /// Wraps a filled row-major buffer.
    ///
    /// `horizon` is the time of the last column.
    pub(crate) fn from_values(
        values: Vec<f64>,
        n_paths: usize,
        n_steps: usize,
        horizon: f64,
    ) -> Self {
        debug_assert_eq!(values.len(), n_paths * (n_steps + 1));
        Self {
            values,
            n_paths,
            n_steps,
            horizon,
        }
    }

    /// Number of paths (rows).
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of time steps; there are `n_steps + 1` columns.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// `(n_paths, n_steps + 1)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_paths, self.n_steps + 1)
    }

    /// Row-major view of every value.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Trajectory of path `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path >= n_paths`.
    #[inline]
    pub fn path(&self, path: usize) -> &[f64] {
        let width = self.n_steps + 1;
        &self.values[path * width..(path + 1) * width]
    }

    /// Iterates over trajectories in path order.
    pub fn paths(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.n_steps + 1)
    }

    /// Value of path `path` at time index `step`, if in range.
    #[inline]
    pub fn value(&self, path: usize, step: usize) -> Option<f64> {
        if path < self.n_paths && step <= self.n_steps {
            Some(self.values[path * (self.n_steps + 1) + step])
        } else {
            None
        }
    }

    /// Iterates over column `step` (one value per path).
    ///
    /// # Panics
    ///
    /// Panics if `step > n_steps`.
    pub fn column(&self, step: usize) -> impl Iterator<Item = f64> + '_ {
        assert!(step <= self.n_steps, "step {} out of range", step);
        self.values
            .iter()
            .skip(step)
            .step_by(self.n_steps + 1)
            .copied()
    }

    /// Terminal value of every path.
    pub fn terminal_values(&self) -> Vec<f64> {
        self.column(self.n_steps).collect()
    }

    /// Time of column `step`: `horizon * step / n_steps`.
    #[inline]
    pub fn time_at(&self, step: usize) -> f64 {
        self.horizon * step as f64 / self.n_steps as f64
    }

    /// Evenly spaced time grid of `n_steps + 1` points from 0 to the horizon.
    pub fn time_grid(&self) -> Vec<f64> {
        (0..=self.n_steps).map(|step| self.time_at(step)).collect()
    }

    /// Column-wise average across paths.
    ///
    /// Each value is scaled by `1 / n_paths` before it is added, so columns
    /// of finite values near `f64::MAX` keep a finite mean.
    pub fn mean_trajectory(&self) -> Vec<f64> {
        let n = self.n_paths as f64;
        let mut means = vec![0.0; self.n_steps + 1];
        for row in self.paths() {
            for (mean, &v) in means.iter_mut().zip(row) {
                *mean += v / n;
            }
        }
        means
    }
}
