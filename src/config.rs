//! Configuration for the convergence engine
//!
//! The gating threshold and the bootstrap resample count are separate knobs:
//! `resamples` defaults to `min_samples` when unset, which keeps the classic
//! single-threshold behaviour while letting callers decouple statistical
//! power from the gate.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors for configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("tolerance must be a number, got NaN")]
    NanTolerance,

    #[error("tick_interval_ms must be > 0")]
    ZeroTickInterval,

    #[error("bootstrap resample count must be > 0 (set `resamples` when min_samples is 0)")]
    ZeroResamples,

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for bootstrap convergence detection
///
/// # Example
/// ```
/// use latconv::config::ConvergenceConfig;
///
/// let config = ConvergenceConfig::default();
/// assert_eq!(config.min_samples, 1000);
/// assert_eq!(config.effective_resamples(), 1000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvergenceConfig {
    /// Minimum number of observations before any convergence attempt
    ///
    /// Default: 1000
    pub min_samples: usize,

    /// Target relative standard deviation of the bootstrap mean
    ///
    /// Convergence is declared when `std_dev < tolerance * mean`. A
    /// non-positive tolerance is accepted and can never be satisfied.
    ///
    /// Default: 0.01 (1%)
    pub tolerance: f64,

    /// Bootstrap resamples drawn per evaluation (`None` = `min_samples`)
    pub resamples: Option<usize>,

    /// Milliseconds between evaluations
    ///
    /// Default: 1000
    pub tick_interval_ms: u64,

    /// Seed for the resampling RNG (`None` = OS entropy)
    pub seed: Option<u64>,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            min_samples: 1000,
            tolerance: 0.01,
            resamples: None,
            tick_interval_ms: 1000,
            seed: None,
        }
    }
}

impl ConvergenceConfig {
    /// Create a configuration with the two core knobs and defaults elsewhere
    pub fn new(min_samples: usize, tolerance: f64) -> Self {
        Self {
            min_samples,
            tolerance,
            ..Self::default()
        }
    }

    /// Tighter tolerance for final benchmark numbers
    pub fn strict() -> Self {
        Self {
            min_samples: 5000,
            tolerance: 0.005,
            ..Self::default()
        }
    }

    /// Loose tolerance and fast ticks for smoke runs
    pub fn quick() -> Self {
        Self {
            min_samples: 100,
            tolerance: 0.05,
            tick_interval_ms: 100,
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Load a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn effective_resamples(&self) -> usize {
        self.resamples.unwrap_or(self.min_samples)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance.is_nan() {
            return Err(ConfigError::NanTolerance);
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }

        if self.effective_resamples() == 0 {
            return Err(ConfigError::ZeroResamples);
        }

        Ok(())
    }
}
