//! Append-only SEG-Y writer
//!
//! The preamble is written when the file is created. Records are appended
//! through a buffered writer; on close the legacy record-count field of the
//! binary header is rewritten in place with the number of appended records.

use crate::codec::encode_samples;
use crate::error::{Result, SegyError};
use crate::preamble::{Preamble, RECORD_COUNT};
use crate::reader::{SegyReader, Trace};
use crate::{TEXT_HEADER_SIZE, TRACE_HEADER_SIZE};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writer producing a SEG-Y file with IBM float samples
pub struct SegyWriter {
    path: PathBuf,
    out: BufWriter<File>,
    preamble: Preamble,
    samples_per_trace: usize,
    record_count: usize,
    scratch: Vec<u8>,
    finalized: bool,
}

impl SegyWriter {
    /// Create (or truncate) `path` and write `preamble` to it
    pub fn create(path: impl AsRef<Path>, preamble: Preamble) -> Result<Self> {
        let path = path.as_ref();
        let samples = preamble.samples_per_trace();
        if samples <= 0 {
            return Err(SegyError::InvalidSampleCount(samples));
        }

        let mut out = BufWriter::new(File::create(path)?);
        preamble.write_to(&mut out)?;

        debug!(
            "Created {} for records of {} samples",
            path.display(),
            samples
        );

        Ok(Self {
            path: path.to_path_buf(),
            out,
            preamble,
            samples_per_trace: samples as usize,
            record_count: 0,
            scratch: Vec::new(),
            finalized: false,
        })
    }

    /// Create a file with the same preamble as an open reader
    pub fn create_like(path: impl AsRef<Path>, reader: &SegyReader) -> Result<Self> {
        Self::create(path, reader.preamble().clone())
    }

    /// Path being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Preamble written at the start of the file
    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    /// Samples each appended record must carry
    pub fn samples_per_trace(&self) -> usize {
        self.samples_per_trace
    }

    /// Records appended so far
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Append one record
    pub fn append(&mut self, header: &[u8], samples: &[f32]) -> Result<()> {
        self.check_shape(header, samples)?;
        self.scratch.clear();
        self.scratch.extend_from_slice(header);
        encode_samples(samples, &mut self.scratch);
        self.out.write_all(&self.scratch)?;
        self.record_count += 1;
        Ok(())
    }

    /// Append a decoded trace, typically one read from another file
    pub fn append_trace(&mut self, trace: &Trace) -> Result<()> {
        self.append(&trace.header, &trace.samples)
    }

    /// Append a batch of records.
    ///
    /// Every record is validated before anything is written, so a shape error
    /// leaves the file unchanged.
    pub fn append_gather<H, P>(&mut self, headers: &[H], payloads: &[P]) -> Result<()>
    where
        H: AsRef<[u8]>,
        P: AsRef<[f32]>,
    {
        if headers.len() != payloads.len() {
            return Err(SegyError::SizeMismatch {
                what: "gather payload count",
                expected: headers.len(),
                actual: payloads.len(),
            });
        }
        for (header, payload) in headers.iter().zip(payloads) {
            self.check_shape(header.as_ref(), payload.as_ref())?;
        }

        let record_size = crate::record_size(self.samples_per_trace);
        self.scratch.clear();
        self.scratch.reserve(record_size * headers.len());
        for (header, payload) in headers.iter().zip(payloads) {
            self.scratch.extend_from_slice(header.as_ref());
            encode_samples(payload.as_ref(), &mut self.scratch);
        }
        self.out.write_all(&self.scratch)?;
        self.record_count += headers.len();
        Ok(())
    }

    /// Finalize the record-count field and flush
    pub fn close(mut self) -> Result<()> {
        self.finalize()
    }

    fn check_shape(&self, header: &[u8], samples: &[f32]) -> Result<()> {
        if header.len() != TRACE_HEADER_SIZE {
            return Err(SegyError::SizeMismatch {
                what: "trace header",
                expected: TRACE_HEADER_SIZE,
                actual: header.len(),
            });
        }
        if samples.len() != self.samples_per_trace {
            return Err(SegyError::SizeMismatch {
                what: "trace payload",
                expected: self.samples_per_trace,
                actual: samples.len(),
            });
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        self.finalized = true;

        self.preamble.set_record_count_field(self.record_count);
        let field = RECORD_COUNT.range();
        let position = (TEXT_HEADER_SIZE + field.start) as u64;

        self.out.seek(SeekFrom::Start(position))?;
        self.out.write_all(&self.preamble.binary()[field])?;
        self.out.seek(SeekFrom::End(0))?;
        self.out.flush()?;

        debug!(
            "Closed {} with {} records",
            self.path.display(),
            self.record_count
        );
        Ok(())
    }
}

impl Drop for SegyWriter {
    fn drop(&mut self) {
        if let Err(e) = self.finalize() {
            warn!("Failed to finalize {}: {}", self.path.display(), e);
        }
    }
}

impl std::fmt::Debug for SegyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegyWriter")
            .field("path", &self.path)
            .field("samples_per_trace", &self.samples_per_trace)
            .field("record_count", &self.record_count)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}
