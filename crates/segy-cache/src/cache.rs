//! Bounded LRU cache of decoded traces
//!
//! Lookups, inserts and evictions are O(1) (hash map plus intrusive recency
//! list from the `lru` crate). Payloads are shared as `Arc<[f32]>` so a hit
//! never copies samples.

use crate::amplitude::AmplitudeRange;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::source::TraceSource;
use crate::stats::CacheStats;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, trace};

/// Decoded trace payload shared between the cache and callers
pub type Samples = Arc<[f32]>;

/// LRU cache in front of a [`TraceSource`]
pub struct TraceCache<'a, S: TraceSource> {
    source: &'a S,
    entries: LruCache<usize, Samples>,
    config: CacheConfig,
    stats: CacheStats,
}

impl<'a, S: TraceSource> TraceCache<'a, S> {
    /// Create a cache holding at most `capacity` traces (0 is treated as 1)
    pub fn new(source: &'a S, capacity: usize) -> Self {
        let config = CacheConfig::default().with_capacity(capacity);
        Self {
            source,
            entries: LruCache::new(clamp(capacity)),
            config,
            stats: CacheStats::default(),
        }
    }

    /// Create a cache from a validated configuration
    pub fn with_config(source: &'a S, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let mut cache = Self::new(source, config.capacity);
        cache.config = config;
        Ok(cache)
    }

    /// Samples of trace `index`, read from the source on a miss.
    ///
    /// A hit marks the entry most recently used. A miss inserts the trace and
    /// evicts the least recently used entry when the cache is full.
    pub fn get(&mut self, index: usize) -> Result<Samples> {
        if let Some(samples) = self.entries.get(&index) {
            self.stats.hits += 1;
            return Ok(Arc::clone(samples));
        }

        self.stats.misses += 1;
        let samples: Samples = self.source.read_trace(index)?.into();
        if let Some((evicted, _)) = self.entries.push(index, Arc::clone(&samples)) {
            if evicted != index {
                self.stats.evictions += 1;
                trace!("Evicted trace {} for trace {}", evicted, index);
            }
        }
        Ok(samples)
    }

    /// Up to `count` consecutive traces starting at `start`.
    ///
    /// Empty when `start` is past the last trace; truncated at the end.
    pub fn range(&mut self, start: usize, count: usize) -> Result<Vec<Samples>> {
        let total = self.source.trace_count();
        if start >= total {
            return Ok(Vec::new());
        }
        let end = start.saturating_add(count).min(total);
        (start..end).map(|index| self.get(index)).collect()
    }

    /// Traces of page `page` with `per_page` traces per page
    pub fn page(&mut self, page: usize, per_page: usize) -> Result<Vec<Samples>> {
        match page.checked_mul(per_page) {
            Some(start) => self.range(start, per_page),
            None => Ok(Vec::new()),
        }
    }

    /// Change the capacity, evicting least recently used entries on shrink
    pub fn set_capacity(&mut self, capacity: usize) {
        let before = self.entries.len();
        self.entries.resize(clamp(capacity));
        let evicted = before - self.entries.len();
        self.stats.evictions += evicted as u64;
        self.config.capacity = self.entries.cap().get();
        debug!(
            "Cache capacity set to {} ({} evicted)",
            self.config.capacity, evicted
        );
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Switch to another source; all cached traces are dropped
    pub fn replace_source(&mut self, source: &'a S) {
        self.source = source;
        self.entries.clear();
        debug!("Cache source replaced ({} traces)", source.trace_count());
    }

    /// Whether trace `index` is cached, without touching its recency
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains(&index)
    }

    /// Number of cached traces
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached traces
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Number of traces in the source
    pub fn trace_count(&self) -> usize {
        self.source.trace_count()
    }

    /// Counters since creation or the last [`Self::reset_stats`]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity(),
            ..self.stats
        }
    }

    /// Zero the hit, miss and eviction counters
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Amplitude range over the first `stats_traces` traces of the source.
    ///
    /// Reads bypass the cache so the scan does not displace hot entries.
    pub fn amplitude_range(&self) -> Result<AmplitudeRange> {
        AmplitudeRange::scan(self.source, self.config.stats_traces)
    }
}

impl<S: TraceSource> std::fmt::Debug for TraceCache<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn clamp(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}
