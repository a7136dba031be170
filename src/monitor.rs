//! Harness-facing convergence monitor
//!
//! [`ConvergenceMonitor`] owns the sample store and configuration for one
//! load-test run. Producers call [`ConvergenceMonitor::submit`] (or clone the
//! store via [`ConvergenceMonitor::store`] into their own threads); the
//! evaluation loop runs either on the caller's thread ([`ConvergenceMonitor::run`])
//! or on a dedicated one ([`ConvergenceMonitor::spawn`]).

use crate::config::{ConfigError, ConvergenceConfig};
use crate::engine::{ConvergenceEngine, EngineError, Result, RunOutcome};
use crate::stats::BootstrapEstimate;
use crate::store::SampleStore;
use crossbeam::channel::{self, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Upper bound on samples reserved up front; the store grows past it on demand
const MAX_PREALLOCATED_SAMPLES: usize = 64 * 1024;

/// Bootstrap convergence monitor for a stream of latency samples
///
/// # Example
///
/// ```no_run
/// use latconv::monitor::ConvergenceMonitor;
///
/// let monitor = ConvergenceMonitor::new(1000, 0.01).unwrap();
/// let handle = monitor.spawn().unwrap();
///
/// // Load loop: stop sending once the mean latency is stable
/// loop {
///     let latency_ns = 1_200_000; // measured request duration
///     if monitor.submit(latency_ns) {
///         break;
///     }
/// }
///
/// let outcome = handle.join().unwrap();
/// assert!(outcome.is_converged());
/// ```
#[derive(Debug)]
pub struct ConvergenceMonitor {
    store: Arc<SampleStore>,
    config: ConvergenceConfig,
    running: Arc<AtomicBool>,
}

impl ConvergenceMonitor {
    /// Create a monitor with `min_samples` and `tolerance`, defaults elsewhere
    pub fn new(min_samples: usize, tolerance: f64) -> std::result::Result<Self, ConfigError> {
        Self::with_config(ConvergenceConfig::new(min_samples, tolerance))
    }

    pub fn with_config(config: ConvergenceConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let capacity = config.min_samples.min(MAX_PREALLOCATED_SAMPLES);
        Ok(Self {
            store: Arc::new(SampleStore::with_capacity(capacity)),
            config,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// Shared handle to the sample store for producer threads
    pub fn store(&self) -> Arc<SampleStore> {
        Arc::clone(&self.store)
    }

    /// Record one latency in nanoseconds; returns the current converged flag
    pub fn submit(&self, nanos: i64) -> bool {
        self.store.submit(nanos)
    }

    pub fn submit_duration(&self, latency: Duration) -> bool {
        self.store.submit_duration(latency)
    }

    pub fn is_converged(&self) -> bool {
        self.store.is_converged()
    }

    pub fn sample_count(&self) -> usize {
        self.store.len()
    }

    pub fn samples(&self) -> Vec<i64> {
        self.store.samples()
    }

    pub fn last_estimate(&self) -> Option<BootstrapEstimate> {
        self.store.last_estimate()
    }

    fn engine(&self) -> Result<(ConvergenceEngine, RunningGuard)> {
        let guard = RunningGuard::acquire(&self.running)?;
        let engine = ConvergenceEngine::new(self.store(), self.config.clone())?;
        Ok((engine, guard))
    }

    /// Run the evaluation loop on the calling thread until convergence
    ///
    /// There is no way to stop this early; use [`spawn`](Self::spawn) when the
    /// harness may need to abort.
    pub fn run(&self) -> Result<RunOutcome> {
        let (mut engine, _guard) = self.engine()?;
        // Held for the whole loop so the channel never disconnects
        let (_stop_tx, stop_rx) = channel::bounded::<()>(1);
        engine.run(&stop_rx)
    }

    /// Run the evaluation loop on a dedicated thread
    ///
    /// At most one evaluation loop runs per monitor at a time.
    pub fn spawn(&self) -> Result<MonitorHandle> {
        let (mut engine, guard) = self.engine()?;
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("latconv-engine".to_string())
            .spawn(move || {
                let _guard = guard;
                engine.run(&stop_rx)
            })
            .map_err(EngineError::Spawn)?;

        debug!("Evaluation thread started");

        Ok(MonitorHandle {
            stop_tx,
            handle: Some(handle),
        })
    }
}

/// Marks a monitor's evaluation loop as active until dropped
struct RunningGuard(Arc<AtomicBool>);

impl RunningGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::AlreadyRunning)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a background evaluation loop
///
/// Dropping the handle stops the loop and waits for the thread to exit.
pub struct MonitorHandle {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<Result<RunOutcome>>>,
}

impl MonitorHandle {
    /// Ask the loop to stop; returns immediately
    pub fn stop(&self) {
        // Full channel means a stop is already pending
        let _ = self.stop_tx.try_send(());
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the loop to finish (convergence or stop)
    pub fn join(mut self) -> Result<RunOutcome> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| EngineError::ThreadPanicked)?,
            None => Err(EngineError::ThreadPanicked),
        }
    }

    /// Stop the loop and wait for it to exit
    pub fn shutdown(self) -> Result<RunOutcome> {
        self.stop();
        self.join()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.stop_tx.try_send(());
            let _ = handle.join();
        }
    }
}
