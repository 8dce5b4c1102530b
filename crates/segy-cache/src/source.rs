//! Sources of decoded traces

use segy_format::SegyReader;

/// Random access to decoded trace payloads
pub trait TraceSource {
    /// Number of traces available
    fn trace_count(&self) -> usize;

    /// Decode the samples of one trace
    fn read_trace(&self, index: usize) -> segy_format::Result<Vec<f32>>;
}

impl TraceSource for SegyReader {
    fn trace_count(&self) -> usize {
        self.record_count()
    }

    fn read_trace(&self, index: usize) -> segy_format::Result<Vec<f32>> {
        self.get_record(index)
    }
}
