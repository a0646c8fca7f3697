//! Error types shared across the routing kernel
//!
//! Planning itself never fails: "no path" is a regular result. Errors only come from
//! malformed input layouts, invalid configuration and the persistence step.

use thiserror::Error;

/// A layout string that cannot be turned into a rectangular [`GridMap`](crate::GridMap)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout string contains no cells at all
    #[error("layout is empty")]
    Empty,
    /// A row differs in length from the first row
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row
        row: usize,
        /// Width taken from row 0
        expected: usize,
        /// Width of the offending row
        found: usize,
    },
}

/// Invalid or unreadable router configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure reported by a [`ResultSink`](crate::controller::ResultSink)
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode route update: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write route update: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a recompute cycle
#[derive(Debug, Error)]
pub enum RouterError {
    /// Every persistence attempt failed; the cycle is marked failed
    #[error("persisting route update failed after {attempts} attempt(s): {source}")]
    Persistence {
        attempts: u32,
        #[source]
        source: SinkError,
    },
}
