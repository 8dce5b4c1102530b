//! Error types for trace map operations

use segy_format::SegyError;
use thiserror::Error;

/// Errors that can occur while building or querying a trace map
#[derive(Debug, Error)]
pub enum TraceMapError {
    /// Reading the SEG-Y file failed
    #[error("SEG-Y error: {0}")]
    Format(#[from] SegyError),

    /// SQLite store error
    #[error("Index store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Key name is not a trace header field or not a stored key column
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Invalid key list or configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Query supplied more values than there are keys
    #[error("Query has {actual} values but the map has {expected} keys")]
    KeyArity {
        /// Number of keys, ordinal included
        expected: usize,
        /// Number of supplied values
        actual: usize,
    },

    /// Stored record list is malformed
    #[error("Corrupt index entry: {0}")]
    CorruptIndex(String),

    /// File has more records than the index can address
    #[error("Too many records to index: {0}")]
    TooManyRecords(usize),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for TraceMapError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e.to_string())
    }
}

/// Result type alias for trace map operations
pub type Result<T> = std::result::Result<T, TraceMapError>;
