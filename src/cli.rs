//! CLI argument parsing for latconv

use crate::config::ConvergenceConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "latconv")]
#[command(version)]
#[command(
    about = "Decide when enough latency samples have been collected for a stable mean",
    long_about = None
)]
pub struct Cli {
    /// File with one latency (integer nanoseconds) per line; reads stdin when omitted
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// TOML config file (flags below override its values)
    #[arg(short = 'C', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum number of samples before evaluating convergence
    #[arg(short = 'n', long = "min-samples", value_name = "N")]
    pub min_samples: Option<usize>,

    /// Target relative standard deviation of the bootstrap mean (e.g. 0.01 = 1%)
    #[arg(short = 't', long = "tolerance", value_name = "FRACTION", allow_negative_numbers = true)]
    pub tolerance: Option<f64>,

    /// Bootstrap resamples per evaluation (default: min-samples)
    #[arg(short = 'r', long = "resamples", value_name = "N")]
    pub resamples: Option<usize>,

    /// Milliseconds between evaluations
    #[arg(long = "tick-ms", value_name = "MS")]
    pub tick_ms: Option<u64>,

    /// Seed for the resampling RNG (default: OS entropy)
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// How long to keep evaluating after the input is exhausted
    #[arg(long = "wait-ms", value_name = "MS", default_value = "5000")]
    pub wait_ms: u64,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of `base`
    pub fn apply_overrides(&self, base: ConvergenceConfig) -> ConvergenceConfig {
        ConvergenceConfig {
            min_samples: self.min_samples.unwrap_or(base.min_samples),
            tolerance: self.tolerance.unwrap_or(base.tolerance),
            resamples: self.resamples.or(base.resamples),
            tick_interval_ms: self.tick_ms.unwrap_or(base.tick_interval_ms),
            seed: self.seed.or(base.seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["latconv"]);
        assert!(cli.input.is_none());
        assert!(cli.config.is_none());
        assert_eq!(cli.wait_ms, 5000);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_parses_input_and_flags() {
        let cli = Cli::parse_from([
            "latconv",
            "-n",
            "200",
            "--tolerance",
            "0.02",
            "--seed",
            "9",
            "--format",
            "json",
            "latencies.txt",
        ]);
        assert_eq!(cli.input, Some(PathBuf::from("latencies.txt")));
        assert_eq!(cli.min_samples, Some(200));
        assert_eq!(cli.tolerance, Some(0.02));
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_negative_tolerance() {
        let cli = Cli::parse_from(["latconv", "--tolerance", "-0.5"]);
        assert_eq!(cli.tolerance, Some(-0.5));
    }

    #[test]
    fn test_overrides_keep_unset_fields() {
        let cli = Cli::parse_from(["latconv", "--tick-ms", "50"]);
        let base = ConvergenceConfig {
            resamples: Some(300),
            ..ConvergenceConfig::new(100, 0.05)
        };
        let config = cli.apply_overrides(base);
        assert_eq!(config.min_samples, 100);
        assert_eq!(config.tolerance, 0.05);
        assert_eq!(config.resamples, Some(300));
        assert_eq!(config.tick_interval_ms, 50);
    }
}
