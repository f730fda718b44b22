//! Checkpoint persistence
//!
//! [`CheckpointStorage`] is the seam between the manager and the medium the
//! record lives on. [`FileCheckpointStorage`] keeps it in a JSON file that is
//! replaced atomically on every write.

use super::model::{Checkpoint, SCHEMA_VERSION};
use crate::domain::{CatalogError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Storage backend for the checkpoint record
#[async_trait]
pub trait CheckpointStorage: Send + Sync {
    /// Read the persisted checkpoint
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Checkpoint`] if a record exists but cannot be used.
    async fn read(&self) -> Result<Option<Checkpoint>>;

    /// Replace the persisted checkpoint with `checkpoint`
    ///
    /// After a crash, a reader observes either the previous record or the new one.
    async fn replace(&self, checkpoint: &Checkpoint) -> Result<()>;
}

/// JSON file checkpoint storage
#[derive(Debug, Clone)]
pub struct FileCheckpointStorage {
    path: PathBuf,
}

impl FileCheckpointStorage {
    /// Create storage backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Render a checkpoint as pretty JSON with sorted keys and a trailing newline
pub fn to_sorted_json(checkpoint: &Checkpoint) -> Result<String> {
    // serde_json::Map is ordered by key
    let value = serde_json::to_value(checkpoint)?;
    let mut json = serde_json::to_string_pretty(&value)?;
    json.push('\n');
    Ok(json)
}

/// Parse checkpoint file contents, rejecting unknown schema versions
pub fn parse_checkpoint(contents: &str, origin: &Path) -> Result<Checkpoint> {
    let value: serde_json::Value = serde_json::from_str(contents).map_err(|e| {
        CatalogError::Checkpoint(format!(
            "Checkpoint file {} is not valid JSON: {e}",
            origin.display()
        ))
    })?;

    match value.get("schema_version").and_then(serde_json::Value::as_u64) {
        Some(version) if version == u64::from(SCHEMA_VERSION) => {}
        Some(version) => {
            return Err(CatalogError::Checkpoint(format!(
                "Checkpoint file {} has unsupported schema_version {version} (expected {SCHEMA_VERSION})",
                origin.display()
            )))
        }
        None => {
            return Err(CatalogError::Checkpoint(format!(
                "Checkpoint file {} has no schema_version",
                origin.display()
            )))
        }
    }

    serde_json::from_value(value).map_err(|e| {
        CatalogError::Checkpoint(format!(
            "Checkpoint file {} does not match the checkpoint layout: {e}",
            origin.display()
        ))
    })
}

#[async_trait]
impl CheckpointStorage for FileCheckpointStorage {
    async fn read(&self) -> Result<Option<Checkpoint>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CatalogError::Checkpoint(format!(
                    "Failed to read checkpoint file {}: {e}",
                    self.path.display()
                )))
            }
        };

        // An interrupted first write can leave an empty file behind
        if contents.trim().is_empty() {
            tracing::warn!(
                path = %self.path.display(),
                "Checkpoint file is empty, treating as absent"
            );
            return Ok(None);
        }

        parse_checkpoint(&contents, &self.path).map(Some)
    }

    async fn replace(&self, checkpoint: &Checkpoint) -> Result<()> {
        let json = to_sorted_json(checkpoint)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CatalogError::Io(format!(
                    "Failed to create checkpoint directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let temp_path = self.temp_path();
        let io_err = |action: &str, path: &Path, e: std::io::Error| {
            CatalogError::Io(format!("Failed to {action} {}: {e}", path.display()))
        };

        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| io_err("create", &temp_path, e))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| io_err("write", &temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| io_err("sync", &temp_path, e))?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| io_err("replace checkpoint with", &temp_path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            batches = checkpoint.batches.len(),
            completed = checkpoint.completed_count(),
            "Checkpoint persisted"
        );

        Ok(())
    }
}
