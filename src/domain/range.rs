//! ID range type
//!
//! Batches cover half-open ranges of record IDs: `[start, end)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range of record IDs, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRange {
    /// First ID covered (inclusive)
    pub start: u64,
    /// First ID not covered (exclusive)
    pub end: u64,
}

impl IdRange {
    /// Create a new range
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of IDs covered by the range
    pub fn width(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Last ID covered, for APIs that take inclusive bounds
    pub fn last(&self) -> u64 {
        self.end.saturating_sub(1).max(self.start)
    }

    /// Render the range the way the export endpoint expects: `[start,last]`
    pub fn to_query_filter(&self) -> String {
        format!("[{},{}]", self.start, self.last())
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_and_last() {
        let range = IdRange::new(1_000_000, 1_002_000);
        assert_eq!(range.width(), 2000);
        assert_eq!(range.last(), 1_001_999);
    }

    #[test]
    fn test_query_filter_is_inclusive() {
        let range = IdRange::new(1_000_000, 1_002_000);
        assert_eq!(range.to_query_filter(), "[1000000,1001999]");
    }

    #[test]
    fn test_display() {
        assert_eq!(IdRange::new(5, 7).to_string(), "[5,7)");
    }
}
