//! Shared sample store
//!
//! Holds the ordered latency samples, the converged flag and the most recent
//! bootstrap estimate behind one mutex. Producers append through
//! [`SampleStore::submit`]; the engine copies the sequence out under the same
//! lock and writes its decision back.
//!
//! # Design
//!
//! ```text
//! ┌──────────────────┐  submit(ns) -> converged  ┌────────────────────────┐
//! │ PRODUCER THREADS │ ────────────────────────► │ Mutex<StoreState>      │
//! └──────────────────┘                           │   samples: Vec<i64>    │
//!                                                │   converged: bool      │
//! ┌──────────────────┐  snapshot() / record()    │   last_estimate        │
//! │ ENGINE THREAD    │ ◄───────────────────────► │                        │
//! └──────────────────┘                           └────────────────────────┘
//! ```
//!
//! The statistic itself is computed on the snapshot outside the lock, so
//! producers only ever wait for a push or a copy.

use crate::stats::BootstrapEstimate;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct StoreState {
    samples: Vec<i64>,
    converged: bool,
    last_estimate: Option<BootstrapEstimate>,
}

/// Thread-safe, append-only latency sample store
///
/// # Example
///
/// ```
/// use latconv::store::SampleStore;
///
/// let store = SampleStore::new();
/// assert!(!store.submit(1_500_000));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SampleStore {
    state: Mutex<StoreState>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate room for `capacity` samples
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(StoreState {
                samples: Vec::with_capacity(capacity),
                ..StoreState::default()
            }),
        }
    }

    // Every field is written in a single statement, so a panicking holder
    // cannot leave the state half-updated.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one latency sample (nanoseconds)
    ///
    /// Returns the converged flag as seen in the same critical section as the
    /// append. Blocks only for the duration of another append or snapshot.
    pub fn submit(&self, nanos: i64) -> bool {
        let mut state = self.lock();
        state.samples.push(nanos);
        state.converged
    }

    /// Append a [`Duration`], saturating at `i64::MAX` nanoseconds
    pub fn submit_duration(&self, latency: Duration) -> bool {
        let nanos = i64::try_from(latency.as_nanos()).unwrap_or(i64::MAX);
        self.submit(nanos)
    }

    pub fn is_converged(&self) -> bool {
        self.lock().converged
    }

    pub fn len(&self) -> usize {
        self.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().samples.is_empty()
    }

    /// Copy of every sample submitted so far, in submission order
    pub fn samples(&self) -> Vec<i64> {
        self.lock().samples.clone()
    }

    /// Bootstrap summary from the most recent evaluation that computed one
    pub fn last_estimate(&self) -> Option<BootstrapEstimate> {
        self.lock().last_estimate
    }

    /// Samples and converged flag read under one lock acquisition
    pub(crate) fn snapshot(&self) -> (Vec<i64>, bool) {
        let state = self.lock();
        (state.samples.clone(), state.converged)
    }

    /// Store an evaluation result
    ///
    /// `converged` latches: passing `false` never clears a previous `true`.
    /// Returns true only for the call that performs the transition.
    pub(crate) fn record(&self, estimate: Option<BootstrapEstimate>, converged: bool) -> bool {
        let mut state = self.lock();
        if estimate.is_some() {
            state.last_estimate = estimate;
        }

        let transitioned = converged && !state.converged;
        state.converged |= converged;
        transitioned
    }
}
