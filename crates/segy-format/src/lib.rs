//! SEG-Y seismic file reading and writing
//!
#![allow(clippy::cast_possible_wrap)] // Header fields are signed on disk
#![allow(clippy::cast_precision_loss)] // Sample markers and intervals
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Consistent log formatting
#![allow(clippy::float_cmp)] // Codec tests compare exact values
//! This crate handles the byte level of SEG-Y revision 1 files with 4-byte
//! IBM floating point samples:
//!
//! - **Codec**: IBM float and big-endian integer conversion
//! - **Fields**: named header fields for the binary and trace headers
//! - **Preamble**: the 3200-byte text and 400-byte binary file headers
//! - **Reader**: memory-mapped random access to records
//! - **Writer**: append-only output with record-count finalization
//!
//! # File Layout
//!
//! ```text
//! [3200 text][400 binary][record 0][record 1]...
//! record = [240 header][samples_per_trace x 4-byte IBM float]
//! ```
//!
//! # Example
//!
//! ```no_run
//! use segy_format::SegyReader;
//!
//! let reader = SegyReader::open("line.sgy")?;
//! let samples = reader.get_record(0)?;
//! let cdp = reader.header_value(0, "CDP")?;
//! println!("{} records, first CDP {cdp}, {} samples", reader.record_count(), samples.len());
//! # Ok::<(), segy_format::SegyError>(())
//! ```

#![warn(missing_docs)]

pub mod codec;
mod error;
pub mod fields;
pub mod preamble;
pub mod reader;
pub mod writer;

/// Synthetic file builders for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Result, SegyError};
pub use fields::{FieldInfo, FieldWidth};
pub use preamble::{BinaryHeader, Preamble};
pub use reader::{SegyReader, Trace};
pub use writer::SegyWriter;

/// Size of the text file header
pub const TEXT_HEADER_SIZE: usize = 3200;

/// Size of the binary file header
pub const BINARY_HEADER_SIZE: usize = 400;

/// Offset of the first record
pub const PREAMBLE_SIZE: usize = TEXT_HEADER_SIZE + BINARY_HEADER_SIZE;

/// Size of the header at the start of every record
pub const TRACE_HEADER_SIZE: usize = 240;

/// Bytes per record for a given number of samples
pub const fn record_size(samples_per_trace: usize) -> usize {
    TRACE_HEADER_SIZE + samples_per_trace * codec::SAMPLE_SIZE
}
