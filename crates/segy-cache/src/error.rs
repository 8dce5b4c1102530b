//! Error types for the trace cache

use segy_format::SegyError;
use thiserror::Error;

/// Errors that can occur when reading through the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The underlying source failed to produce a trace
    #[error("Trace source error: {0}")]
    Source(#[from] SegyError),

    /// Invalid cache configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
