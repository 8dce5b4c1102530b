//! Cache configuration

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::TraceCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of decoded traces held (0 is treated as 1)
    pub capacity: usize,

    /// Traces read from the start of the file when computing the amplitude
    /// range
    pub stats_traces: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            stats_traces: 1000,
        }
    }
}

impl CacheConfig {
    /// Set the number of cached traces
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the number of traces sampled for amplitude statistics
    #[must_use]
    pub const fn with_stats_traces(mut self, stats_traces: usize) -> Self {
        self.stats_traces = stats_traces;
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.stats_traces == 0 {
            return Err(CacheError::InvalidConfig(
                "stats_traces must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
