//! Memory-mapped random access reader for SEG-Y files
//!
//! The whole file is mapped read-only at open. Record geometry is derived
//! from the binary header once; every accessor is a bounds-checked slice into
//! the mapping.

use crate::codec::decode_samples;
use crate::error::{Result, SegyError};
use crate::fields::read_trace_field;
use crate::preamble::Preamble;
use crate::{PREAMBLE_SIZE, TRACE_HEADER_SIZE};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One record decoded into its header bytes and samples
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Record number within the file
    pub index: usize,
    /// Raw 240-byte trace header
    pub header: Vec<u8>,
    /// Decoded samples
    pub samples: Vec<f32>,
}

impl Trace {
    /// Read a named field from the trace header
    pub fn field(&self, name: &str) -> Result<i32> {
        read_trace_field(&self.header, name)
    }
}

/// Read-only view of a SEG-Y file
pub struct SegyReader {
    path: PathBuf,
    mmap: Mmap,
    preamble: Preamble,
    samples_per_trace: usize,
    record_size: usize,
    record_count: usize,
}

impl SegyReader {
    /// Open a file and derive its record geometry.
    ///
    /// Bytes after the last whole record are ignored.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        if file_size < PREAMBLE_SIZE as u64 {
            return Err(SegyError::TruncatedPreamble {
                expected: PREAMBLE_SIZE as u64,
                actual: file_size,
            });
        }

        // Memory-map the file for zero-copy record access
        #[allow(unsafe_code)]
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        let preamble = Preamble::from_bytes(&mmap[..PREAMBLE_SIZE])?;
        let samples = preamble.samples_per_trace();
        if samples <= 0 {
            return Err(SegyError::InvalidSampleCount(samples));
        }

        let samples_per_trace = samples as usize;
        let record_size = crate::record_size(samples_per_trace);
        let data_len = mmap.len() - PREAMBLE_SIZE;
        let record_count = data_len / record_size;

        let trailing = data_len % record_size;
        if trailing != 0 {
            warn!(
                "{}: ignoring {} trailing bytes after record {}",
                path.display(),
                trailing,
                record_count
            );
        }

        debug!(
            "Opened {}: {} records of {} samples ({} bytes each)",
            path.display(),
            record_count,
            samples_per_trace,
            record_size
        );

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            preamble,
            samples_per_trace,
            record_size,
            record_count,
        })
    }

    /// Path the reader was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text and binary headers
    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    /// Samples per record
    pub fn samples_per_trace(&self) -> usize {
        self.samples_per_trace
    }

    /// Sample interval in microseconds
    pub fn sample_interval(&self) -> f32 {
        self.preamble.sample_interval()
    }

    /// Bytes per record, header included
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Number of whole records in the file
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Size of the mapped file in bytes
    pub fn file_size(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Byte offset of record `index` from the start of the file
    pub fn record_offset(&self, index: usize) -> u64 {
        PREAMBLE_SIZE as u64 + index as u64 * self.record_size as u64
    }

    /// Decode the samples of one record
    pub fn get_record(&self, index: usize) -> Result<Vec<f32>> {
        let record = self.record_bytes(index)?;
        Ok(decode_samples(&record[TRACE_HEADER_SIZE..]))
    }

    /// Raw 240-byte header of one record
    pub fn get_header(&self, index: usize) -> Result<&[u8]> {
        let record = self.record_bytes(index)?;
        Ok(&record[..TRACE_HEADER_SIZE])
    }

    /// Read a named trace header field of one record
    pub fn header_value(&self, index: usize, name: &str) -> Result<i32> {
        read_trace_field(self.get_header(index)?, name)
    }

    /// Header and payload bytes of one record
    pub fn record_bytes(&self, index: usize) -> Result<&[u8]> {
        self.check_index(index)?;
        let start = self.record_offset(index) as usize;
        Ok(&self.mmap[start..start + self.record_size])
    }

    /// Bytes of every whole record, back to back
    pub fn records_bytes(&self) -> &[u8] {
        let end = PREAMBLE_SIZE + self.record_count * self.record_size;
        &self.mmap[PREAMBLE_SIZE..end]
    }

    /// Read `byte_count` bytes starting at the beginning of record `start`.
    ///
    /// Reads that would run past the end of the file fail instead of
    /// returning short data.
    pub fn read_raw(&self, start: usize, byte_count: usize) -> Result<&[u8]> {
        self.check_index(start)?;
        let offset = self.record_offset(start) as usize;
        let end = offset
            .checked_add(byte_count)
            .filter(|&end| end <= self.mmap.len())
            .ok_or(SegyError::IndexOutOfRange {
                index: start + byte_count.div_ceil(self.record_size),
                count: self.record_count,
            })?;
        Ok(&self.mmap[offset..end])
    }

    /// Decode header and samples for each index, in the order given
    pub fn read_traces(&self, indices: &[usize]) -> Result<Vec<Trace>> {
        indices
            .iter()
            .map(|&index| {
                let record = self.record_bytes(index)?;
                Ok(Trace {
                    index,
                    header: record[..TRACE_HEADER_SIZE].to_vec(),
                    samples: decode_samples(&record[TRACE_HEADER_SIZE..]),
                })
            })
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.record_count {
            return Err(SegyError::IndexOutOfRange {
                index,
                count: self.record_count,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for SegyReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegyReader")
            .field("path", &self.path)
            .field("samples_per_trace", &self.samples_per_trace)
            .field("record_size", &self.record_size)
            .field("record_count", &self.record_count)
            .finish_non_exhaustive()
    }
}
