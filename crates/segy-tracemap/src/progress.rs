//! Build progress reporting

use std::fmt;

/// Stage of a trace map build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildPhase {
    /// Reading record headers
    Scanning,
    /// Writing groups to the store
    Writing,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::Writing => write!(f, "writing"),
        }
    }
}

/// One progress update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProgress {
    /// Current stage
    pub phase: BuildPhase,
    /// Units completed (records while scanning, groups while writing)
    pub done: usize,
    /// Total units for this stage
    pub total: usize,
}

impl BuildProgress {
    /// Completion of this stage in percent
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.done as f64 * 100.0 / self.total as f64
    }
}

impl fmt::Display for BuildProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} ({:.1}%)",
            self.phase,
            self.done,
            self.total,
            self.percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_and_display() {
        let progress = BuildProgress {
            phase: BuildPhase::Scanning,
            done: 25,
            total: 100,
        };
        assert!((progress.percent() - 25.0).abs() < f64::EPSILON);
        assert_eq!(progress.to_string(), "scanning 25/100 (25.0%)");

        let empty = BuildProgress {
            phase: BuildPhase::Writing,
            done: 0,
            total: 0,
        };
        assert!((empty.percent() - 100.0).abs() < f64::EPSILON);
    }
}
