//! Persistent trace index for SEG-Y files
//!
#![allow(clippy::cast_possible_wrap)] // Record numbers are stored as i32
#![allow(clippy::cast_precision_loss)] // Progress percentages
#![allow(clippy::uninlined_format_args)] // Consistent log formatting
//! A [`TraceMap`] groups the records of a file by a tuple of trace header
//! fields (for example CDP and offset) and keeps the groups in an SQLite
//! database, so gathers can be located without rescanning the file.
//!
//! # Building
//!
//! The header scan runs on a rayon worker pool over memory-mapped chunks of
//! the file. Each group is sorted by a chosen header field with ties broken
//! by record number, and the whole table is replaced in a single
//! transaction.
//!
//! # Querying
//!
//! Queries bind any subset of the keys. The reserved trailing key
//! [`SEQUENCE_NUMBER`] selects one record of the result by position:
//!
//! ```no_run
//! use segy_tracemap::TraceMap;
//!
//! let map = TraceMap::open("line.db", &["CDP", "offset", "sequence_number"])?;
//! let gather = map.query(&[Some(1200)])?;
//! let third = map.query(&[Some(1200), None, Some(2)])?;
//! # Ok::<(), segy_tracemap::TraceMapError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
mod error;
pub mod gather;
pub mod keys;
mod map;
pub mod progress;
mod scan;
pub mod source;
mod store;

pub use config::TraceMapConfig;
pub use error::{Result, TraceMapError};
pub use gather::Gather;
pub use keys::{KeySpec, SEQUENCE_NUMBER};
pub use map::TraceMap;
pub use progress::{BuildPhase, BuildProgress};
pub use source::IndexSource;
