//! Run report for the `latconv` binary (text and JSON)

use crate::config::ConvergenceConfig;
use crate::engine::RunOutcome;
use crate::stats::BootstrapEstimate;
use serde::Serialize;

/// Summary of one convergence run
#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceReport {
    pub converged: bool,
    pub ticks: u64,
    /// Samples submitted before convergence (or end of input)
    pub samples_submitted: usize,
    /// Input samples left unread because the run had already converged
    pub input_remaining: bool,
    pub estimate: Option<BootstrapEstimate>,
    pub config: ConvergenceConfig,
}

impl ConvergenceReport {
    pub fn new(
        outcome: &RunOutcome,
        samples_submitted: usize,
        input_remaining: bool,
        estimate: Option<BootstrapEstimate>,
        config: &ConvergenceConfig,
    ) -> Self {
        Self {
            converged: outcome.is_converged(),
            ticks: outcome.ticks(),
            samples_submitted,
            input_remaining,
            estimate,
            config: config.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        let mut report = String::new();

        if self.converged {
            report.push_str("CONVERGED\n\n");
        } else {
            report.push_str("NOT CONVERGED\n\n");
        }

        report.push_str(&format!(
            "Samples:    {} (min {}, tolerance {})\n",
            self.samples_submitted, self.config.min_samples, self.config.tolerance
        ));
        report.push_str(&format!("Ticks:      {}\n", self.ticks));

        match &self.estimate {
            Some(estimate) => {
                report.push_str(&format!(
                    "Mean:       {:.1} ns ({:.3} ms)\n",
                    estimate.mean,
                    estimate.mean / 1_000_000.0
                ));
                let relative = estimate.relative_std_dev();
                let relative = if relative.is_finite() {
                    format!("{:.2}% of mean", relative * 100.0)
                } else {
                    "mean is 0".to_string()
                };
                report.push_str(&format!(
                    "Std dev:    {:.1} ns ({}, {} resamples)\n",
                    estimate.std_dev, relative, estimate.resamples
                ));
            }
            None => report.push_str("Mean:       n/a (not enough samples)\n"),
        }

        if self.input_remaining {
            report.push_str("Stopped reading input early\n");
        }

        report
    }
}
