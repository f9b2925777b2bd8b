use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while bulk-loading records from a delimited text source.
///
/// A load that fails leaves the target index untouched.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not open record source {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read record source: {0}")]
    Io(#[from] io::Error),

    #[error("malformed record on line {line}: expected {expected} comma-separated fields, found {found}")]
    Malformed {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid {field} on line {line}: {source}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        #[source]
        source: ParseIntError,
    },
}

/// Rejected rebalancing tunables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("min_rebalance_size {value} exceeds the maximum of {max}")]
    MinRebalanceSize { value: usize, max: usize },

    #[error("skew threshold {value} must be greater than 0 and at most {max}")]
    SkewThreshold { value: f64, max: f64 },
}
