//! LRU cache of decoded SEG-Y traces
//!
#![allow(clippy::cast_precision_loss)] // Rates and test markers
#![allow(clippy::uninlined_format_args)] // Consistent log formatting
//! [`TraceCache`] sits in front of any [`TraceSource`] (normally a
//! [`segy_format::SegyReader`]) and keeps a bounded number of decoded traces
//! in strict least-recently-used order. Bulk access by range or page goes
//! through the cache, and [`AmplitudeRange`] computes display bounds from
//! the first traces of a file.
//!
//! ```no_run
//! use segy_cache::TraceCache;
//! use segy_format::SegyReader;
//!
//! let reader = SegyReader::open("line.sgy")?;
//! let mut cache = TraceCache::new(&reader, 1000);
//! let page = cache.page(0, 200)?;
//! let range = cache.amplitude_range()?;
//! println!("{} traces, amplitudes {}..{}", page.len(), range.min, range.max);
//! # Ok::<(), segy_cache::CacheError>(())
//! ```

#![warn(missing_docs)]

pub mod amplitude;
pub mod cache;
pub mod config;
mod error;
pub mod source;
pub mod stats;

pub use amplitude::AmplitudeRange;
pub use cache::{Samples, TraceCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use source::TraceSource;
pub use stats::CacheStats;
