//! Traces selected by a trace map query

use crate::error::Result;
use segy_format::Trace;

/// Records returned by a query, read in trace map order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gather {
    traces: Vec<Trace>,
}

impl Gather {
    pub(crate) fn new(traces: Vec<Trace>) -> Self {
        Self { traces }
    }

    /// Number of traces
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Whether the query matched nothing
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Decoded traces in gather order
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Record numbers in gather order
    pub fn records(&self) -> Vec<usize> {
        self.traces.iter().map(|t| t.index).collect()
    }

    /// Value of a header field for every trace
    pub fn field_values(&self, name: &str) -> Result<Vec<i32>> {
        Ok(self
            .traces
            .iter()
            .map(|t| t.field(name))
            .collect::<segy_format::Result<Vec<i32>>>()?)
    }

    /// Consume the gather
    pub fn into_traces(self) -> Vec<Trace> {
        self.traces
    }
}

impl IntoIterator for Gather {
    type Item = Trace;
    type IntoIter = std::vec::IntoIter<Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.into_iter()
    }
}
