//! Identity of the file an index was built from

use segy_format::SegyReader;
use serde::Serialize;

/// File an index was built from, recorded with every build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSource {
    /// Canonical path of the SEG-Y file
    pub path: String,
    /// File size in bytes at build time
    pub file_size: u64,
    /// Whole records at build time
    pub record_count: usize,
    /// Header field ordering records within a group
    pub sort_key: String,
}

impl IndexSource {
    /// Describe `reader` as the source of a build sorted by `sort_key`
    pub fn of(reader: &SegyReader, sort_key: &str) -> Self {
        Self {
            path: canonical_path(reader),
            file_size: reader.file_size(),
            record_count: reader.record_count(),
            sort_key: sort_key.to_string(),
        }
    }

    /// Whether this is the file `reader` has open, unchanged in size and
    /// record count
    pub fn is_file(&self, reader: &SegyReader) -> bool {
        self.path == canonical_path(reader)
            && self.file_size == reader.file_size()
            && self.record_count == reader.record_count()
    }
}

fn canonical_path(reader: &SegyReader) -> String {
    std::fs::canonicalize(reader.path())
        .unwrap_or_else(|_| reader.path().to_path_buf())
        .display()
        .to_string()
}
