//! Text and binary file headers preceding the trace records
//!
//! The preamble is a 3200-byte text block (40 cards of 80 characters)
//! followed by a 400-byte binary block of big-endian integer fields. Named
//! access goes through [`crate::fields`]; [`BinaryHeader`] is a typed view of
//! the leading defined fields.

use crate::codec::decode_i16;
use crate::error::{Result, SegyError};
use crate::fields::{FieldInfo, binary_field, read_field, write_field};
use crate::{BINARY_HEADER_SIZE, PREAMBLE_SIZE, TEXT_HEADER_SIZE};
use binrw::{BinRead, BinWrite};
use std::fmt;
use std::io::{Cursor, Write};

/// Number of 80-character cards in the text header
pub const TEXT_CARD_COUNT: usize = 40;

/// Width of one text header card
pub const TEXT_CARD_WIDTH: usize = 80;

/// `SamplesPerTrace` (bytes 21-22)
pub const SAMPLES_PER_TRACE: FieldInfo = FieldInfo::short(21);

/// `SampleInterval` in microseconds (bytes 17-18)
pub const SAMPLE_INTERVAL: FieldInfo = FieldInfo::short(17);

/// `DataTracesPerEnsemble` (bytes 13-14), rewritten with the trace count
/// when a writer is finalized
pub const RECORD_COUNT: FieldInfo = FieldInfo::short(13);

/// Sample format code for 4-byte IBM floating point
pub const IBM_FLOAT_FORMAT: i16 = 1;

/// Typed view of the defined fields at the start of the binary header
#[derive(Debug, Clone, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct BinaryHeader {
    /// Job identification number
    pub job_id: i32,
    /// Line number
    pub line_number: i32,
    /// Reel number
    pub reel_number: i32,
    /// Data traces per ensemble (record count after a write)
    pub data_traces_per_ensemble: i16,
    /// Auxiliary traces per ensemble
    pub aux_traces_per_ensemble: i16,
    /// Sample interval in microseconds
    pub sample_interval: i16,
    /// Sample interval of original field recording
    pub sample_interval_original: i16,
    /// Samples per data trace
    pub samples_per_trace: i16,
    /// Samples per trace of original field recording
    pub samples_per_trace_original: i16,
    /// Data sample format code (1 = IBM float)
    pub data_sample_format: i16,
    /// Ensemble fold
    pub ensemble_fold: i16,
    /// Trace sorting code
    pub sorting_code: i16,
    /// Vertical sum code
    pub vertical_sum_code: i16,
    /// Sweep frequency at start (Hz)
    pub sweep_frequency_start: i16,
    /// Sweep frequency at end (Hz)
    pub sweep_frequency_end: i16,
    /// Sweep length (ms)
    pub sweep_length: i16,
    /// Sweep type code
    pub sweep_type: i16,
    /// Sweep trace taper length at start (ms)
    pub sweep_taper_length_start: i16,
    /// Sweep trace taper length at end (ms)
    pub sweep_taper_length_end: i16,
    /// Taper type
    pub taper_type: i16,
    /// Correlated data traces
    pub correlated_traces: i16,
    /// Binary gain recovered
    pub binary_gain_recovered: i16,
    /// Amplitude recovery method
    pub amplitude_recovery_method: i16,
    /// Measurement system
    pub measurement_system: i16,
    /// Impulse signal polarity
    pub impulse_signal_polarity: i16,
    /// Vibratory polarity code
    pub vibratory_polarity_code: i16,
}

impl BinaryHeader {
    /// Encoded size of the typed view
    pub const SIZE: usize = 58;
}

/// The two fixed-size blocks at the start of every SEG-Y file
#[derive(Clone, PartialEq, Eq)]
pub struct Preamble {
    text: Box<[u8; TEXT_HEADER_SIZE]>,
    binary: Box<[u8; BINARY_HEADER_SIZE]>,
}

impl Preamble {
    /// Create a blank preamble for IBM float traces of the given shape.
    ///
    /// The text header is filled with spaces.
    pub fn new(samples_per_trace: i16, sample_interval_us: i16) -> Result<Self> {
        let mut preamble = Self {
            text: Box::new([b' '; TEXT_HEADER_SIZE]),
            binary: Box::new([0; BINARY_HEADER_SIZE]),
        };
        preamble.set_binary_header(&BinaryHeader {
            samples_per_trace,
            samples_per_trace_original: samples_per_trace,
            sample_interval: sample_interval_us,
            sample_interval_original: sample_interval_us,
            data_sample_format: IBM_FLOAT_FORMAT,
            ..BinaryHeader::default()
        })?;
        Ok(preamble)
    }

    /// Build a preamble from separately supplied text and binary blocks
    pub fn from_parts(text: &[u8], binary: &[u8]) -> Result<Self> {
        let text: [u8; TEXT_HEADER_SIZE] =
            text.try_into().map_err(|_| SegyError::SizeMismatch {
                what: "text header",
                expected: TEXT_HEADER_SIZE,
                actual: text.len(),
            })?;
        let binary: [u8; BINARY_HEADER_SIZE] =
            binary.try_into().map_err(|_| SegyError::SizeMismatch {
                what: "binary header",
                expected: BINARY_HEADER_SIZE,
                actual: binary.len(),
            })?;
        Ok(Self {
            text: Box::new(text),
            binary: Box::new(binary),
        })
    }

    /// Parse the preamble from the first 3600 bytes of a file
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < PREAMBLE_SIZE {
            return Err(SegyError::TruncatedPreamble {
                expected: PREAMBLE_SIZE as u64,
                actual: data.len() as u64,
            });
        }
        Self::from_parts(
            &data[..TEXT_HEADER_SIZE],
            &data[TEXT_HEADER_SIZE..PREAMBLE_SIZE],
        )
    }

    /// Raw text header block
    pub fn text(&self) -> &[u8] {
        &self.text[..]
    }

    /// Raw binary header block
    pub fn binary(&self) -> &[u8] {
        &self.binary[..]
    }

    /// Read a named binary header field
    pub fn field(&self, name: &str) -> Result<i32> {
        read_field(&self.binary[..], &binary_field(name)?)
    }

    /// Overwrite a named binary header field
    pub fn set_field(&mut self, name: &str, value: i32) -> Result<()> {
        write_field(&mut self.binary[..], &binary_field(name)?, value)
    }

    /// Samples per trace as declared in the binary header
    pub fn samples_per_trace(&self) -> i32 {
        self.short(SAMPLES_PER_TRACE)
    }

    /// Sample interval in microseconds
    pub fn sample_interval(&self) -> f32 {
        f32::from(self.short(SAMPLE_INTERVAL) as i16)
    }

    /// Value of the legacy record-count field
    pub fn record_count_field(&self) -> i32 {
        self.short(RECORD_COUNT)
    }

    /// Store a trace count in the legacy record-count field (truncated to `i16`)
    pub(crate) fn set_record_count_field(&mut self, count: usize) {
        let bytes = (count as i16).to_be_bytes();
        self.binary[RECORD_COUNT.range()].copy_from_slice(&bytes);
    }

    /// Decode the typed view of the binary header
    pub fn binary_header(&self) -> Result<BinaryHeader> {
        let mut cursor = Cursor::new(&self.binary[..BinaryHeader::SIZE]);
        Ok(BinaryHeader::read(&mut cursor)?)
    }

    /// Encode the typed view into the binary header, leaving the rest intact
    pub fn set_binary_header(&mut self, header: &BinaryHeader) -> Result<()> {
        let mut cursor = Cursor::new(&mut self.binary[..BinaryHeader::SIZE]);
        header.write(&mut cursor)?;
        Ok(())
    }

    /// Text header split into 80-character cards, decoded lossily
    pub fn text_lines(&self) -> Vec<String> {
        self.text
            .chunks(TEXT_CARD_WIDTH)
            .map(|card| String::from_utf8_lossy(card).trim_end().to_string())
            .collect()
    }

    /// Replace the text header with the given cards.
    ///
    /// Each line is truncated or space-padded to 80 bytes; missing cards are
    /// blank and lines beyond the 40th are dropped.
    pub fn set_text_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.text.fill(b' ');
        for (card, line) in self
            .text
            .chunks_mut(TEXT_CARD_WIDTH)
            .zip(lines.iter().take(TEXT_CARD_COUNT))
        {
            let bytes = line.as_ref().as_bytes();
            let len = bytes.len().min(TEXT_CARD_WIDTH);
            card[..len].copy_from_slice(&bytes[..len]);
        }
    }

    /// Write both blocks
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(&self.text[..])?;
        out.write_all(&self.binary[..])
    }

    fn short(&self, field: FieldInfo) -> i32 {
        let start = field.range().start;
        i32::from(decode_i16([self.binary[start], self.binary[start + 1]]))
    }
}

impl fmt::Debug for Preamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preamble")
            .field("samples_per_trace", &self.samples_per_trace())
            .field("sample_interval", &self.sample_interval())
            .field("record_count_field", &self.record_count_field())
            .finish_non_exhaustive()
    }
}
