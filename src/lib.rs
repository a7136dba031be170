//! latconv - Bootstrap convergence detection for latency measurements
//!
//! This library decides, online, when a load-testing harness has collected
//! enough latency samples to trust their mean. Producers submit one
//! measurement per completed request; a background engine periodically
//! bootstraps the sampling distribution of the mean and latches a converged
//! flag once its relative spread falls below a configured tolerance.

pub mod cli;
pub mod config;
pub mod engine;
pub mod input;
pub mod monitor;
pub mod report;
pub mod stats;
pub mod store;

pub use config::ConvergenceConfig;
pub use engine::{ConvergenceEngine, EngineError, Evaluation, RunOutcome};
pub use monitor::{ConvergenceMonitor, MonitorHandle};
pub use stats::BootstrapEstimate;
pub use store::SampleStore;
