//! Latency input parsing for the `latconv` binary
//!
//! One nanosecond latency per line. Blank lines and `#` comments are skipped.

use std::io::BufRead;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("line {line}: invalid latency {value:?} (expected integer nanoseconds)")]
    InvalidLatency { line: usize, value: String },

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse one input line; `Ok(None)` for blank and comment lines
///
/// `line_no` is 1-based and only used for error messages.
pub fn parse_line(raw: &str, line_no: usize) -> Result<Option<i64>, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| InputError::InvalidLatency {
            line: line_no,
            value: trimmed.to_string(),
        })
}

/// Lazily parse latencies from a reader, stopping at the first bad line
pub fn latencies<R: BufRead>(reader: R) -> impl Iterator<Item = Result<i64, InputError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match line {
            Ok(line) => parse_line(&line, idx + 1).transpose(),
            Err(e) => Some(Err(InputError::Io(e))),
        })
}

/// Parse every latency in `data`
pub fn parse_latencies(data: &[u8]) -> Result<Vec<i64>, InputError> {
    latencies(data).collect()
}
