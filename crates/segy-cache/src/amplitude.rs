//! Global amplitude range for display scaling

use crate::error::Result;
use crate::source::TraceSource;
use tracing::debug;

/// Ranges narrower than this are widened to 1.0
const DEGENERATE_SPAN: f32 = 1e-6;

/// Minimum and maximum finite amplitude over a set of traces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeRange {
    /// Smallest finite sample
    pub min: f32,
    /// Largest finite sample
    pub max: f32,
}

impl Default for AmplitudeRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl AmplitudeRange {
    /// Scan the first `max_traces` traces of `source`.
    ///
    /// Non-finite samples are skipped. When every sample is equal (span
    /// below 1e-6) the maximum is raised to `min + 1.0`; when no finite
    /// sample exists the range is `0.0..=1.0`. Read errors propagate.
    pub fn scan<S: TraceSource + ?Sized>(source: &S, max_traces: usize) -> Result<Self> {
        let count = max_traces.min(source.trace_count());
        let mut bounds: Option<(f32, f32)> = None;

        for index in 0..count {
            for &sample in source.read_trace(index)?.iter().filter(|s| s.is_finite()) {
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(sample), max.max(sample)),
                    None => (sample, sample),
                });
            }
        }

        let range = match bounds {
            Some((min, max)) if max - min < DEGENERATE_SPAN => Self { min, max: min + 1.0 },
            Some((min, max)) => Self { min, max },
            None => Self::default(),
        };
        debug!(
            "Amplitude range over {} traces: {} to {}",
            count, range.min, range.max
        );
        Ok(range)
    }

    /// Distance between the bounds
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Larger absolute bound, for symmetric scaling around zero
    pub fn abs_max(&self) -> f32 {
        self.min.abs().max(self.max.abs())
    }

    /// Map a sample into `0.0..=1.0` relative to the range
    pub fn normalize(&self, sample: f32) -> f32 {
        ((sample - self.min) / self.span()).clamp(0.0, 1.0)
    }
}
