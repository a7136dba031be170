use anyhow::{Context, Result};
use clap::Parser;
use latconv::cli::{Cli, OutputFormat};
use latconv::config::ConvergenceConfig;
use latconv::input;
use latconv::monitor::{ConvergenceMonitor, MonitorHandle};
use latconv::report::ConvergenceReport;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Exit status when the input ran out before the mean converged
const EXIT_NOT_CONVERGED: i32 = 2;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(args: &Cli) -> Result<ConvergenceConfig> {
    let base = match &args.config {
        Some(path) => ConvergenceConfig::from_file(path)?,
        None => ConvergenceConfig::default(),
    };
    Ok(args.apply_overrides(base))
}

fn open_input(args: &Cli) -> Result<Box<dyn BufRead>> {
    match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Submit latencies until the input ends or the monitor reports convergence
///
/// Returns true when input was left unread.
fn feed(monitor: &ConvergenceMonitor, reader: Box<dyn BufRead>) -> Result<bool> {
    let mut samples = input::latencies(reader);
    while let Some(latency) = samples.next() {
        if monitor.submit(latency?) {
            return Ok(samples.next().is_some());
        }
    }
    Ok(false)
}

/// Give the evaluation loop up to `wait` to converge on the submitted samples
fn wait_for_convergence(handle: &MonitorHandle, wait: Duration) {
    let deadline = Instant::now() + wait;
    while !handle.is_finished() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(Duration::from_millis(10)));
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let monitor = ConvergenceMonitor::with_config(config).context("Invalid configuration")?;
    let handle = monitor.spawn()?;

    let input_remaining = feed(&monitor, open_input(&args)?)?;

    wait_for_convergence(&handle, Duration::from_millis(args.wait_ms));
    let outcome = handle.shutdown()?;

    let report = ConvergenceReport::new(
        &outcome,
        monitor.sample_count(),
        input_remaining,
        monitor.last_estimate(),
        monitor.config(),
    );

    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if !report.converged {
        io::stdout().flush()?;
        std::process::exit(EXIT_NOT_CONVERGED);
    }

    Ok(())
}
