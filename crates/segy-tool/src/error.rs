//! Error types for tool commands

use thiserror::Error;

/// Errors reported by `segy-tool` commands
#[derive(Debug, Error)]
pub enum ToolError {
    /// File reading or writing failed
    #[error(transparent)]
    Format(#[from] segy_format::SegyError),

    /// Index build or query failed
    #[error(transparent)]
    TraceMap(#[from] segy_tracemap::TraceMapError),

    /// Cached trace access failed
    #[error(transparent)]
    Cache(#[from] segy_cache::CacheError),

    /// Output could not be written
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Argument combination the command cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for tool commands
pub type Result<T> = std::result::Result<T, ToolError>;
