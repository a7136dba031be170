//! Statistics primitives for bootstrap convergence
//!
//! Pure functions over latency samples: arithmetic mean, population variance,
//! and a single bootstrap resample mean. [`BootstrapEstimate`] combines them
//! into the summary the engine judges convergence on.
//!
//! # Bootstrap
//!
//! ```text
//! samples ──┬─ resample (with replacement, same size) ─ mean ─┐
//!           ├─ resample ─────────────────────────────── mean ─┼─ mean / variance / std_dev
//!           └─ ... `resamples` times ──────────────────── mean ─┘
//! ```
//!
//! The spread of the resample means approximates the sampling distribution of
//! the mean without assuming a parametric shape, which matters for skewed,
//! heavy-tailed latency data.
//!
//! Empty input is always an error: a mean of nothing must never read as a
//! stable estimate.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for statistics primitives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Cannot compute {what} of an empty sequence")]
    EmptyInput { what: &'static str },
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Arithmetic mean of a non-empty sequence
///
/// Uses a running mean (Welford update) rather than `sum / n`, so a
/// constant-valued input returns that constant exactly.
///
/// # Example
/// ```
/// use latconv::stats::mean;
///
/// assert_eq!(mean(&[2.0, 4.0, 6.0]).unwrap(), 4.0);
/// assert!(mean(&[]).is_err());
/// ```
pub fn mean(xs: &[f64]) -> Result<f64> {
    if xs.is_empty() {
        return Err(StatsError::EmptyInput { what: "mean" });
    }

    let mut running = 0.0;
    for (i, &x) in xs.iter().enumerate() {
        running += (x - running) / (i + 1) as f64;
    }
    Ok(running)
}

/// Population variance of `xs` around a precomputed `mean`
///
/// Divides by `len(xs)`, not `len(xs) - 1`.
pub fn variance(xs: &[f64], mean: f64) -> Result<f64> {
    if xs.is_empty() {
        return Err(StatsError::EmptyInput { what: "variance" });
    }

    let sum_sq: f64 = xs.iter().map(|&x| (x - mean) * (x - mean)).sum();
    Ok(sum_sq / xs.len() as f64)
}

/// Mean of one bootstrap resample of `xs`
///
/// Draws `xs.len()` indices uniformly with replacement. Sums in `i128` so
/// nanosecond latencies near `i64::MAX` cannot overflow.
pub fn bootstrap_mean<R: Rng + ?Sized>(xs: &[i64], rng: &mut R) -> Result<f64> {
    if xs.is_empty() {
        return Err(StatsError::EmptyInput {
            what: "bootstrap mean",
        });
    }

    let n = xs.len();
    let sum: i128 = (0..n).map(|_| xs[rng.gen_range(0..n)] as i128).sum();
    Ok(sum as f64 / n as f64)
}

/// Summary of the bootstrap distribution of the mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapEstimate {
    /// Number of bootstrap resamples drawn
    pub resamples: usize,
    /// Number of observations each resample was drawn from
    pub sample_count: usize,
    /// Mean of the resample means
    pub mean: f64,
    /// Population variance of the resample means
    pub variance: f64,
    /// Standard deviation of the resample means
    pub std_dev: f64,
}

impl BootstrapEstimate {
    /// Draw `resamples` bootstrap means from `xs` and summarize them
    ///
    /// # Errors
    ///
    /// [`StatsError::EmptyInput`] when `xs` is empty or `resamples` is 0.
    ///
    /// # Example
    /// ```
    /// use latconv::stats::BootstrapEstimate;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let estimate = BootstrapEstimate::compute(&[100; 5], 5, &mut rng).unwrap();
    /// assert_eq!(estimate.mean, 100.0);
    /// assert_eq!(estimate.std_dev, 0.0);
    /// assert!(estimate.is_stable(0.1));
    /// ```
    pub fn compute<R: Rng + ?Sized>(xs: &[i64], resamples: usize, rng: &mut R) -> Result<Self> {
        let means = (0..resamples)
            .map(|_| bootstrap_mean(xs, &mut *rng))
            .collect::<Result<Vec<f64>>>()?;

        let boot_mean = mean(&means)?;
        let boot_var = variance(&means, boot_mean)?;

        Ok(Self {
            resamples,
            sample_count: xs.len(),
            mean: boot_mean,
            variance: boot_var,
            std_dev: boot_var.sqrt(),
        })
    }

    /// Convergence criterion: `std_dev < tolerance * mean`
    ///
    /// Strict inequality, so a non-positive bound is never satisfied.
    pub fn is_stable(&self, tolerance: f64) -> bool {
        self.std_dev < tolerance * self.mean
    }

    /// Standard deviation relative to the magnitude of the mean, `std_dev / |mean|`
    ///
    /// Infinite when the mean is 0.
    pub fn relative_std_dev(&self) -> f64 {
        if self.mean == 0.0 {
            f64::INFINITY
        } else {
            self.std_dev / self.mean.abs()
        }
    }
}
