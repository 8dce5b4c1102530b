//! Configuration for building and storing a trace map

use crate::error::{Result, TraceMapError};
use serde::{Deserialize, Serialize};

/// Default table name in the SQLite database
pub const DEFAULT_TABLE: &str = "trace_map";

/// Default scan chunk size (256 MiB)
pub const DEFAULT_CHUNK_BYTES: usize = 256 * 1024 * 1024;

/// Default wait for a database locked by another connection
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Table recording which file each index was built from
pub const SOURCE_TABLE: &str = "trace_map_sources";

/// Configuration for a trace map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceMapConfig {
    /// Table holding the index
    pub table: String,

    /// Bytes of records scanned per chunk (rounded down to whole records,
    /// at least one record)
    pub chunk_bytes: usize,

    /// Worker threads for the scan; 0 uses one per logical CPU
    pub threads: usize,

    /// Milliseconds to wait on a locked database before failing
    pub busy_timeout_ms: u64,
}

impl Default for TraceMapConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            threads: 0,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl TraceMapConfig {
    /// Set the table name
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the scan chunk size in bytes
    #[must_use]
    pub const fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    /// Set the number of worker threads
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the lock wait in milliseconds (0 fails immediately)
    #[must_use]
    pub const fn with_busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(TraceMapError::InvalidConfig(
                "table name must not be empty".to_string(),
            ));
        }
        if self.table == SOURCE_TABLE {
            return Err(TraceMapError::InvalidConfig(format!(
                "table name {SOURCE_TABLE} is reserved"
            )));
        }
        if self.chunk_bytes == 0 {
            return Err(TraceMapError::InvalidConfig(
                "chunk_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TraceMapConfig::default();
        assert_eq!(config.table, "trace_map");
        assert_eq!(config.chunk_bytes, 256 * 1024 * 1024);
        assert_eq!(config.threads, 0);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders_and_validation() {
        let config = TraceMapConfig::default()
            .with_table("by_cdp")
            .with_chunk_bytes(4096)
            .with_threads(2);
        assert_eq!(config.table, "by_cdp");
        assert_eq!(config.chunk_bytes, 4096);
        assert_eq!(config.threads, 2);

        assert!(config.clone().with_table("").validate().is_err());
        assert!(config.clone().with_table(SOURCE_TABLE).validate().is_err());
        assert_eq!(config.clone().with_busy_timeout_ms(0).busy_timeout_ms, 0);
        assert!(config.with_chunk_bytes(0).validate().is_err());
    }

    #[test]
    fn test_partial_deserialization() {
        let config: TraceMapConfig =
            serde_json::from_str(r#"{"threads": 3}"#).unwrap_or_default();
        assert_eq!(config.threads, 3);
        assert_eq!(config.table, DEFAULT_TABLE);
    }
}
