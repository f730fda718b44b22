//! Checkpoint manager
//!
//! Owns the lifecycle of the checkpoint record: bootstrap, one-time last-ID
//! resolution, one-time planning, selection of the next pending batch and
//! per-batch completion. Every mutating call persists before it returns.

use super::model::{Batch, Checkpoint};
use super::storage::CheckpointStorage;
use crate::adapters::catalog::LastIdSource;
use crate::core::planner::{self, ArtifactNaming};
use crate::domain::{CatalogError, Result};
use chrono::Utc;
use std::sync::Arc;

/// Checkpoint manager
pub struct CheckpointManager {
    storage: Arc<dyn CheckpointStorage>,
}

impl CheckpointManager {
    /// Create a manager over a storage backend
    pub fn new(storage: Arc<dyn CheckpointStorage>) -> Self {
        Self { storage }
    }

    /// Load the checkpoint, creating and persisting an empty one if none exists
    ///
    /// # Errors
    ///
    /// A record that exists but cannot be parsed is a fatal
    /// [`CatalogError::Checkpoint`]; it is never silently reinitialized.
    pub async fn load(&self) -> Result<Checkpoint> {
        if let Some(checkpoint) = self.storage.read().await? {
            tracing::info!(
                batches = checkpoint.batches.len(),
                completed = checkpoint.completed_count(),
                last_known_id = ?checkpoint.last_known_id,
                "Loaded checkpoint"
            );
            return Ok(checkpoint);
        }

        let checkpoint = Checkpoint::empty();
        self.storage.replace(&checkpoint).await?;
        tracing::info!("Created new checkpoint");
        Ok(checkpoint)
    }

    /// Read the checkpoint without creating one
    pub async fn read_existing(&self) -> Result<Option<Checkpoint>> {
        self.storage.read().await
    }

    /// Resolve `last_known_id` once
    ///
    /// No-op when it is already set. Otherwise the source is queried exactly
    /// once and the result persisted.
    ///
    /// # Errors
    ///
    /// Any source failure becomes [`CatalogError::UpstreamUnavailable`]; the
    /// checkpoint is left unchanged.
    pub async fn resolve_last_known_id(
        &self,
        checkpoint: &mut Checkpoint,
        source: &dyn LastIdSource,
    ) -> Result<u64> {
        if let Some(id) = checkpoint.last_known_id {
            tracing::debug!(last_known_id = id, "Last known ID already resolved");
            return Ok(id);
        }

        let id = source.last_id().await.map_err(|e| match e {
            CatalogError::UpstreamUnavailable(_) => e,
            other => CatalogError::UpstreamUnavailable(other.to_string()),
        })?;

        checkpoint.last_known_id = Some(id);
        checkpoint.touch();
        self.storage.replace(checkpoint).await?;

        tracing::info!(last_known_id = id, "Resolved last known ID");
        Ok(id)
    }

    /// Plan batches once, covering `[range_start, last_known_id + 1)`
    ///
    /// No-op when the checkpoint already has batches.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::State`] if `last_known_id` has not been
    /// resolved, or a planning error if the range is empty.
    pub async fn ensure_batches(
        &self,
        checkpoint: &mut Checkpoint,
        range_start: u64,
        chunk_size: u64,
        naming: &ArtifactNaming,
    ) -> Result<()> {
        if !checkpoint.batches.is_empty() {
            tracing::debug!(
                batches = checkpoint.batches.len(),
                "Batches already planned"
            );
            return Ok(());
        }

        let last_known_id = checkpoint.last_known_id.ok_or_else(|| {
            CatalogError::State("cannot plan batches before last_known_id is resolved".to_string())
        })?;
        if last_known_id < range_start {
            return Err(CatalogError::Validation(format!(
                "last known ID {last_known_id} is below range start {range_start}"
            )));
        }

        let range_end = last_known_id.checked_add(1).ok_or_else(|| {
            CatalogError::Validation(format!(
                "last known ID {last_known_id} leaves no room for an exclusive range end"
            ))
        })?;
        let batches = planner::plan(range_start, range_end, chunk_size, naming)?;
        tracing::info!(
            range_start,
            last_known_id,
            chunk_size,
            batches = batches.len(),
            "Planned batches"
        );

        checkpoint.batches = batches;
        checkpoint.touch();
        self.storage.replace(checkpoint).await
    }

    /// First batch in stored order that has not been completed
    pub fn next_eligible_batch(&self, checkpoint: &Checkpoint) -> Option<Batch> {
        checkpoint
            .batches
            .iter()
            .find(|b| !b.is_completed())
            .cloned()
    }

    /// Mark the batch with `batch.range_start` completed and persist
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::State`] if no stored batch starts at that ID.
    pub async fn mark_completed(&self, checkpoint: &mut Checkpoint, batch: &Batch) -> Result<()> {
        let stored = checkpoint
            .batches
            .iter_mut()
            .find(|b| b.range_start == batch.range_start)
            .ok_or_else(|| {
                CatalogError::State(format!(
                    "no batch starting at {} in checkpoint",
                    batch.range_start
                ))
            })?;

        if stored.completed_at.is_none() {
            stored.completed_at = Some(Utc::now());
        }
        checkpoint.touch();
        self.storage.replace(checkpoint).await
    }

    /// Record the artifact validator's result
    pub async fn mark_files_validated(
        &self,
        checkpoint: &mut Checkpoint,
        validated: bool,
    ) -> Result<()> {
        checkpoint.files_validated = validated;
        checkpoint.touch();
        self.storage.replace(checkpoint).await
    }
}
