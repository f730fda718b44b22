//! Artifact files in the download directory
//!
//! Artifacts are written to a hidden `.part` sibling first and renamed into
//! place once complete, so a file with the final name is always whole.

use crate::domain::{CatalogError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// A completed artifact on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    /// File name within the download directory
    pub name: String,
    /// Full path
    pub path: PathBuf,
    /// Size in bytes
    pub bytes: u64,
    /// Hex SHA-256 of the contents
    pub sha256: String,
}

/// Writes artifacts into a download directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the download directory if it is missing
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CatalogError::Io(format!(
                "Failed to create download directory {}: {e}",
                self.dir.display()
            ))
        })
    }

    /// Start writing artifact `name`
    pub async fn begin(&self, name: &str) -> Result<ArtifactWriter> {
        self.ensure_dir().await?;

        let final_path = self.dir.join(name);
        let temp_path = self.dir.join(format!(".{name}.part"));
        let file = tokio::fs::File::create(&temp_path).await.map_err(|e| {
            CatalogError::Io(format!("Failed to create {}: {e}", temp_path.display()))
        })?;

        Ok(ArtifactWriter {
            name: name.to_string(),
            final_path,
            temp_path,
            file,
            hasher: Sha256::new(),
            bytes: 0,
        })
    }

    /// Write a complete in-memory body as artifact `name`
    pub async fn write_bytes(&self, name: &str, contents: &[u8]) -> Result<ArtifactRecord> {
        let mut writer = self.begin(name).await?;
        if let Err(e) = writer.write_chunk(contents).await {
            writer.abort().await;
            return Err(e);
        }
        writer.finish().await
    }
}

/// An artifact being written
pub struct ArtifactWriter {
    name: String,
    final_path: PathBuf,
    temp_path: PathBuf,
    file: tokio::fs::File,
    hasher: Sha256,
    bytes: u64,
}

impl ArtifactWriter {
    /// Append a chunk
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await.map_err(|e| {
            CatalogError::Io(format!("Failed to write {}: {e}", self.temp_path.display()))
        })?;
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
        Ok(())
    }

    /// Flush, sync and move the artifact into place, replacing any previous copy
    pub async fn finish(mut self) -> Result<ArtifactRecord> {
        let io_err = |action: &str, path: &Path, e: std::io::Error| {
            CatalogError::Io(format!("Failed to {action} {}: {e}", path.display()))
        };

        self.file
            .flush()
            .await
            .map_err(|e| io_err("flush", &self.temp_path, e))?;
        self.file
            .sync_all()
            .await
            .map_err(|e| io_err("sync", &self.temp_path, e))?;
        drop(self.file);

        tokio::fs::rename(&self.temp_path, &self.final_path)
            .await
            .map_err(|e| io_err("move artifact into place from", &self.temp_path, e))?;

        Ok(ArtifactRecord {
            name: self.name,
            path: self.final_path,
            bytes: self.bytes,
            sha256: format!("{:x}", self.hasher.finalize()),
        })
    }

    /// Discard the partial file
    pub async fn abort(self) {
        drop(self.file);
        if let Err(e) = tokio::fs::remove_file(&self.temp_path).await {
            tracing::warn!(
                path = %self.temp_path.display(),
                error = %e,
                "Failed to remove partial artifact"
            );
        }
    }
}
