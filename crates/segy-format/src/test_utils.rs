//! Synthetic SEG-Y files for tests
//!
//! Files are assembled byte by byte (not through [`crate::SegyWriter`]) so
//! reader tests do not depend on the writer.

use crate::codec::encode_samples;
use crate::error::Result;
use crate::fields::{trace_field, write_field};
use crate::preamble::Preamble;
use crate::TRACE_HEADER_SIZE;
use std::path::{Path, PathBuf};

/// Build a 240-byte trace header with the given named fields set
pub fn trace_header(fields: &[(&str, i32)]) -> Result<Vec<u8>> {
    let mut header = vec![0u8; TRACE_HEADER_SIZE];
    for &(name, value) in fields {
        write_field(&mut header, &trace_field(name)?, value)?;
    }
    Ok(header)
}

/// Samples `marker, marker + 1, ...` so each record is recognizable
pub fn marker_samples(count: usize, marker: f32) -> Vec<f32> {
    (0..count).map(|i| marker + i as f32).collect()
}

/// Builder for an in-memory or on-disk synthetic file
#[derive(Debug, Clone)]
pub struct SyntheticFile {
    samples_per_trace: i16,
    sample_interval: i16,
    traces: Vec<(Vec<(String, i32)>, Vec<f32>)>,
    trailing_bytes: usize,
}

impl SyntheticFile {
    /// Start a file whose records carry `samples_per_trace` samples
    pub fn new(samples_per_trace: i16) -> Self {
        Self {
            samples_per_trace,
            sample_interval: 4000,
            traces: Vec::new(),
            trailing_bytes: 0,
        }
    }

    /// Set the sample interval in microseconds
    pub fn with_interval(mut self, sample_interval: i16) -> Self {
        self.sample_interval = sample_interval;
        self
    }

    /// Append a record with named header fields and explicit samples
    pub fn trace(mut self, fields: &[(&str, i32)], samples: Vec<f32>) -> Self {
        let fields = fields
            .iter()
            .map(|&(name, value)| (name.to_string(), value))
            .collect();
        self.traces.push((fields, samples));
        self
    }

    /// Append a record whose samples are a ramp starting at `marker`
    pub fn marker_trace(self, fields: &[(&str, i32)], marker: f32) -> Self {
        let samples = marker_samples(self.samples_per_trace.max(0) as usize, marker);
        self.trace(fields, samples)
    }

    /// Append garbage after the last record
    pub fn with_trailing_bytes(mut self, count: usize) -> Self {
        self.trailing_bytes = count;
        self
    }

    /// Number of records added so far
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Whether no records were added
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Encode the complete file
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut preamble = Preamble::new(self.samples_per_trace, self.sample_interval)?;
        preamble.set_record_count_field(self.traces.len());

        let mut bytes = Vec::new();
        preamble.write_to(&mut bytes)?;
        for (fields, samples) in &self.traces {
            let fields: Vec<(&str, i32)> = fields
                .iter()
                .map(|(name, value)| (name.as_str(), *value))
                .collect();
            bytes.extend_from_slice(&trace_header(&fields)?);
            encode_samples(samples, &mut bytes);
        }
        bytes.resize(bytes.len() + self.trailing_bytes, 0xAB);
        Ok(bytes)
    }

    /// Write the file to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Write the file into a fresh temporary directory.
    ///
    /// The directory is removed when the returned guard is dropped.
    pub fn write_temp(&self) -> Result<(tempfile::TempDir, PathBuf)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("synthetic.sgy");
        self.write_to(&path)?;
        Ok((dir, path))
    }
}

/// The ensemble/offset layout used across the workspace tests.
///
/// Records are stored out of order: ensemble 1 has offsets 4, 2, 0, 3, 1 and
/// ensemble 2 has offsets 1, 0, 2, interleaved. Each record's samples start
/// at `100 * ensemble + offset`.
pub fn ensemble_offset_file(samples_per_trace: i16) -> SyntheticFile {
    const LAYOUT: [(i32, i32); 8] = [
        (1, 4),
        (2, 1),
        (1, 2),
        (1, 0),
        (2, 0),
        (1, 3),
        (2, 2),
        (1, 1),
    ];

    LAYOUT
        .iter()
        .fold(SyntheticFile::new(samples_per_trace), |file, &(ensemble, offset)| {
            file.marker_trace(
                &[("CDP", ensemble), ("offset", offset)],
                (100 * ensemble + offset) as f32,
            )
        })
}
