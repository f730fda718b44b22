//! Download directory validation

use super::marc::check_records;
use super::report::{InvalidFile, ValidFile, ValidationReport};
use crate::domain::{CatalogError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Files larger than this that fail validation are logged as suspicious
pub const SUSPICIOUS_SIZE_BYTES: u64 = 1000;

/// Extension given to quarantined files
pub const QUARANTINE_EXTENSION: &str = "txt";

/// Validates downloaded artifacts and quarantines the ones that are not MARC
pub struct MarcValidator {
    extension: String,
}

impl MarcValidator {
    /// Validator for files ending in `.{extension}`
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    async fn artifact_paths(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            CatalogError::Io(format!(
                "Failed to read download directory {}: {e}",
                dir.display()
            ))
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            CatalogError::Io(format!(
                "Failed to read download directory {}: {e}",
                dir.display()
            ))
        })? {
            let path = entry.path();
            let matches = path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str());
            if matches && entry.file_type().await.is_ok_and(|t| t.is_file()) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Validate every artifact in `dir`
    ///
    /// Invalid files are renamed to `.txt` so later consumers skip them.
    pub async fn validate_all(&self, dir: &Path) -> Result<ValidationReport> {
        let started = Instant::now();
        let mut report = ValidationReport::new();

        for path in self.artifact_paths(dir).await? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let contents = tokio::fs::read(&path).await.map_err(|e| {
                CatalogError::Io(format!("Failed to read artifact {}: {e}", path.display()))
            })?;
            let bytes = contents.len() as u64;

            match check_records(&contents) {
                Ok(records) => {
                    tracing::debug!(file = %name, records, "Artifact is valid MARC");
                    report.valid.push(ValidFile {
                        name,
                        records,
                        bytes,
                        sha256: format!("{:x}", Sha256::digest(&contents)),
                    });
                }
                Err(reason) => {
                    let renamed = path.with_extension(QUARANTINE_EXTENSION);
                    tokio::fs::rename(&path, &renamed).await.map_err(|e| {
                        CatalogError::Io(format!(
                            "Failed to quarantine {} as {}: {e}",
                            path.display(),
                            renamed.display()
                        ))
                    })?;

                    if bytes > SUSPICIOUS_SIZE_BYTES {
                        tracing::warn!(
                            file = %name,
                            bytes,
                            reason = %reason,
                            "Large artifact failed MARC validation"
                        );
                    } else {
                        tracing::info!(file = %name, reason = %reason, "Artifact is not MARC");
                    }

                    report.invalid.push(InvalidFile {
                        name,
                        renamed_to: renamed
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        bytes,
                        reason,
                    });
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            checked = report.files_checked(),
            valid = report.valid.len(),
            invalid = report.invalid.len(),
            "Artifact validation finished"
        );
        Ok(report)
    }
}
