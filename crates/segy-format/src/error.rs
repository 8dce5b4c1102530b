//! Error types for SEG-Y reading and writing

use thiserror::Error;

/// Errors that can occur when decoding, reading or writing SEG-Y files
#[derive(Debug, Error)]
pub enum SegyError {
    /// The file is shorter than the text and binary preambles
    #[error("Truncated preamble: expected at least {expected} bytes, file has {actual}")]
    TruncatedPreamble {
        /// Required preamble size
        expected: u64,
        /// Actual file size
        actual: u64,
    },

    /// The binary preamble declares a non-positive sample count
    #[error("Invalid sample count in binary header: {0}")]
    InvalidSampleCount(i32),

    /// Symbolic field name not present in the field table
    #[error("Unknown {table} header field: {name}")]
    UnknownField {
        /// Table that was searched ("binary" or "trace")
        table: &'static str,
        /// Requested field name
        name: String,
    },

    /// Field range exceeds the supplied buffer
    #[error("Buffer too small: field needs {needed} bytes, buffer has {actual}")]
    BufferTooSmall {
        /// End of the field range (bytes)
        needed: usize,
        /// Buffer length
        actual: usize,
    },

    /// Record access beyond the end of the file
    #[error("Record index {index} out of range (record count {count})")]
    IndexOutOfRange {
        /// Requested record index
        index: usize,
        /// Number of records in the file
        count: usize,
    },

    /// Appended or supplied block does not match the declared record shape
    #[error("Size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        /// What was being checked
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Binary parsing error
    #[error("Binary parsing error: {0}")]
    BinRead(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<binrw::Error> for SegyError {
    fn from(e: binrw::Error) -> Self {
        Self::BinRead(e.to_string())
    }
}

/// Result type alias for SEG-Y operations
pub type Result<T> = std::result::Result<T, SegyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SegyError::InvalidSampleCount(-3);
        assert!(err.to_string().contains("-3"));

        let err = SegyError::UnknownField {
            table: "trace",
            name: "NoSuchField".to_string(),
        };
        assert!(err.to_string().contains("trace"));
        assert!(err.to_string().contains("NoSuchField"));

        let err = SegyError::IndexOutOfRange { index: 7, count: 5 };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains('5'));

        let err = SegyError::SizeMismatch {
            what: "trace header",
            expected: 240,
            actual: 12,
        };
        assert!(err.to_string().contains("240"));
    }
}
