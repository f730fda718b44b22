//! Checkpoint model for tracking export progress
//!
//! A single [`Checkpoint`] record holds the planned batch list and which
//! batches have been processed. It is always persisted as a whole.

use crate::domain::IdRange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk schema version
pub const SCHEMA_VERSION: u32 = 1;

/// One fixed-width slice of the ID space
///
/// Bounds are half-open: `[range_start, range_end)`. They never change after
/// planning; only `completed_at` is written later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// First ID covered (inclusive)
    pub range_start: u64,

    /// First ID not covered (exclusive)
    pub range_end: u64,

    /// Stable artifact file name, derived from the batch ordinal
    pub artifact_name: String,

    /// When the batch reached a terminal-successful outcome
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Batch {
    /// Create a pending batch
    pub fn new(range: IdRange, artifact_name: impl Into<String>) -> Self {
        Self {
            range_start: range.start,
            range_end: range.end,
            artifact_name: artifact_name.into(),
            completed_at: None,
        }
    }

    /// ID range of the batch
    pub fn range(&self) -> IdRange {
        IdRange::new(self.range_start, self.range_end)
    }

    /// Whether the batch has been processed
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Persisted export progress
///
/// # Examples
///
/// ```
/// use catalog_export::core::checkpoint::Checkpoint;
///
/// let checkpoint = Checkpoint::empty();
/// assert!(checkpoint.batches.is_empty());
/// assert!(checkpoint.last_known_id.is_none());
/// assert!(!checkpoint.files_validated);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Record layout version
    pub schema_version: u32,

    /// Highest record ID at planning time; set once
    #[serde(default)]
    pub last_known_id: Option<u64>,

    /// Time of the last mutation
    pub updated_at: DateTime<Utc>,

    /// Planned batches in creation order
    #[serde(default)]
    pub batches: Vec<Batch>,

    /// Set by the artifact validator once downloads have been checked
    #[serde(default)]
    pub files_validated: bool,
}

impl Checkpoint {
    /// A fresh checkpoint with no plan and no last known ID
    pub fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            last_known_id: None,
            updated_at: Utc::now(),
            batches: Vec::new(),
            files_validated: false,
        }
    }

    /// Record a mutation
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Number of batches processed so far
    pub fn completed_count(&self) -> usize {
        self.batches.iter().filter(|b| b.is_completed()).count()
    }

    /// Number of batches still waiting
    pub fn pending_count(&self) -> usize {
        self.batches.len() - self.completed_count()
    }

    /// Whether every planned batch has been processed
    pub fn is_drained(&self) -> bool {
        !self.batches.is_empty() && self.pending_count() == 0
    }
}
