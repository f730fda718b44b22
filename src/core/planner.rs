//! Batch planning
//!
//! Splits an ID range into fixed-width half-open batches with stable
//! artifact names.

use crate::core::checkpoint::Batch;
use crate::domain::{CatalogError, IdRange, Result};

/// How artifact file names are derived from batch ordinals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    /// File name prefix
    pub prefix: String,
    /// File extension, without the dot
    pub extension: String,
}

impl ArtifactNaming {
    /// Create a naming scheme
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Artifact name for the batch at 1-based `ordinal`
    ///
    /// ```
    /// use catalog_export::core::planner::ArtifactNaming;
    ///
    /// let naming = ArtifactNaming::default();
    /// assert_eq!(naming.artifact_name(3), "catalog_export_0003.mrc");
    /// ```
    pub fn artifact_name(&self, ordinal: usize) -> String {
        format!("{}_{:04}.{}", self.prefix, ordinal, self.extension)
    }
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        Self::new("catalog_export", "mrc")
    }
}

/// Plan batches covering `[range_start, range_end)`
///
/// Every batch is exactly `chunk_size` wide; the last one may extend past
/// `range_end`. The batch count is `ceil((range_end - range_start) / chunk_size)`.
///
/// # Errors
///
/// Returns [`CatalogError::Validation`] if `chunk_size` is zero or the range is empty.
pub fn plan(
    range_start: u64,
    range_end: u64,
    chunk_size: u64,
    naming: &ArtifactNaming,
) -> Result<Vec<Batch>> {
    if chunk_size == 0 {
        return Err(CatalogError::Validation(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if range_end <= range_start {
        return Err(CatalogError::Validation(format!(
            "cannot plan empty range [{range_start},{range_end})"
        )));
    }

    let mut batches = Vec::new();
    let mut step = range_start;
    while step < range_end {
        let end = step.checked_add(chunk_size).ok_or_else(|| {
            CatalogError::Validation(format!("batch starting at {step} overflows the ID space"))
        })?;
        let ordinal = batches.len() + 1;
        batches.push(Batch::new(
            IdRange::new(step, end),
            naming.artifact_name(ordinal),
        ));
        step = end;
    }

    Ok(batches)
}
