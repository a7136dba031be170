//! Convergence engine: periodic bootstrap evaluation
//!
//! A two-state machine (`Evaluating` → `Converged`) driven by a fixed tick.
//! Each tick copies the current samples out of the [`SampleStore`], draws
//! bootstrap resample means, and latches the converged flag once the spread
//! of those means falls below `tolerance * mean`.
//!
//! ```text
//!              len < min_samples
//!              or std_dev >= tolerance * mean
//!                  ┌──────────┐
//!                  ▼          │
//!   start ──► EVALUATING ─────┘
//!                  │
//!                  │ std_dev < tolerance * mean
//!                  ▼
//!              CONVERGED  (terminal, loop exits)
//! ```
//!
//! The loop waits between ticks on a stop channel rather than a bare sleep,
//! so a harness can abort a run that will never converge.

use crate::config::{ConfigError, ConvergenceConfig};
use crate::stats::{BootstrapEstimate, StatsError};
use crate::store::SampleStore;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors for engine construction and evaluation
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Bootstrap evaluation failed: {0}")]
    Stats(#[from] StatsError),

    #[error("An evaluation loop is already running for this monitor")]
    AlreadyRunning,

    #[error("Failed to spawn evaluation thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Evaluation thread panicked")]
    ThreadPanicked,
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineState {
    Evaluating,
    Converged(BootstrapEstimate),
}

/// Result of a single evaluation tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Evaluation {
    /// Fewer samples than `min_samples`; no statistic computed
    Insufficient { have: usize, need: usize },
    /// Estimate computed but not yet within tolerance
    Unstable(BootstrapEstimate),
    /// Estimate within tolerance (terminal)
    Converged(BootstrapEstimate),
}

impl Evaluation {
    pub fn is_converged(&self) -> bool {
        matches!(self, Evaluation::Converged(_))
    }

    pub fn estimate(&self) -> Option<&BootstrapEstimate> {
        match self {
            Evaluation::Insufficient { .. } => None,
            Evaluation::Unstable(estimate) | Evaluation::Converged(estimate) => Some(estimate),
        }
    }
}

/// How an evaluation loop ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Converged {
        ticks: u64,
        estimate: BootstrapEstimate,
    },
    /// Stop was requested before convergence
    Stopped { ticks: u64 },
}

impl RunOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, RunOutcome::Converged { .. })
    }

    pub fn ticks(&self) -> u64 {
        match self {
            RunOutcome::Converged { ticks, .. } | RunOutcome::Stopped { ticks } => *ticks,
        }
    }
}

/// Bootstrap convergence evaluator over a shared [`SampleStore`]
///
/// # Example
///
/// ```
/// use latconv::config::ConvergenceConfig;
/// use latconv::engine::ConvergenceEngine;
/// use latconv::store::SampleStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(SampleStore::new());
/// let config = ConvergenceConfig { seed: Some(1), ..ConvergenceConfig::new(5, 0.1) };
/// let mut engine = ConvergenceEngine::new(Arc::clone(&store), config).unwrap();
///
/// for _ in 0..5 {
///     store.submit(100);
/// }
/// assert!(engine.evaluate().unwrap().is_converged());
/// assert!(store.is_converged());
/// ```
pub struct ConvergenceEngine {
    store: Arc<SampleStore>,
    config: ConvergenceConfig,
    rng: StdRng,
    state: EngineState,
}

impl ConvergenceEngine {
    /// Create an engine; validates `config` and seeds the RNG
    pub fn new(store: Arc<SampleStore>, config: ConvergenceConfig) -> Result<Self> {
        config.validate()?;

        if config.tolerance <= 0.0 {
            warn!(
                tolerance = config.tolerance,
                "Non-positive tolerance: convergence criterion can never be satisfied"
            );
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            store,
            config,
            rng,
            state: EngineState::Evaluating,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// Run one evaluation tick and record the result in the store
    ///
    /// After convergence this returns the terminal estimate without
    /// touching the samples again.
    pub fn evaluate(&mut self) -> Result<Evaluation> {
        if let EngineState::Converged(estimate) = self.state {
            return Ok(Evaluation::Converged(estimate));
        }

        let (samples, already_converged) = self.store.snapshot();
        if already_converged {
            if let Some(estimate) = self.store.last_estimate() {
                self.state = EngineState::Converged(estimate);
                return Ok(Evaluation::Converged(estimate));
            }
        }

        let need = self.config.min_samples;
        if samples.is_empty() || samples.len() < need {
            debug!(have = samples.len(), need, "Waiting for more samples");
            return Ok(Evaluation::Insufficient {
                have: samples.len(),
                need,
            });
        }

        let estimate = BootstrapEstimate::compute(
            &samples,
            self.config.effective_resamples(),
            &mut self.rng,
        )?;
        let stable = estimate.is_stable(self.config.tolerance);

        debug!(
            samples = samples.len(),
            mean = estimate.mean,
            std_dev = estimate.std_dev,
            bound = self.config.tolerance * estimate.mean,
            stable,
            "Bootstrap evaluation"
        );

        self.store.record(Some(estimate), stable);

        if stable {
            self.state = EngineState::Converged(estimate);
            Ok(Evaluation::Converged(estimate))
        } else {
            Ok(Evaluation::Unstable(estimate))
        }
    }

    /// Evaluate once per tick until convergence or a stop signal
    ///
    /// The first evaluation runs immediately. Receiving a message on `stop`,
    /// or every sender being dropped, ends the loop with
    /// [`RunOutcome::Stopped`].
    pub fn run(&mut self, stop: &Receiver<()>) -> Result<RunOutcome> {
        let interval = self.config.tick_interval();
        let mut ticks = 0u64;

        loop {
            ticks += 1;
            if let Evaluation::Converged(estimate) = self.evaluate()? {
                info!(
                    ticks,
                    samples = estimate.sample_count,
                    mean = estimate.mean,
                    relative_std_dev = estimate.relative_std_dev(),
                    "Latency mean converged"
                );
                return Ok(RunOutcome::Converged { ticks, estimate });
            }

            match stop.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    info!(ticks, "Evaluation stopped before convergence");
                    return Ok(RunOutcome::Stopped { ticks });
                }
            }
        }
    }
}
