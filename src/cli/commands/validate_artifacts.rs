//! Validate artifacts command implementation
//!
//! Runs the MARC validator over the download directory once the export is
//! drained, and records the result in the checkpoint.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use crate::config::{load_config, CatalogExportConfig};
use crate::core::checkpoint::{CheckpointManager, FileCheckpointStorage};
use crate::core::verification::{MarcValidator, ValidationReport};
use crate::domain::Result;
use clap::Args;
use std::sync::Arc;

/// Arguments for the validate-artifacts command
#[derive(Args, Debug)]
pub struct ValidateArtifactsArgs {
    /// Validate again even if the checkpoint says it was already done
    #[arg(long)]
    pub force: bool,
}

/// What a validation pass did
#[derive(Debug)]
pub enum ValidationRun {
    /// The checkpoint already recorded a validation
    AlreadyValidated,
    /// Batches are still pending; validating now would be premature
    NotDrained { pending: usize },
    /// The validator ran
    Completed(ValidationReport),
}

impl ValidateArtifactsArgs {
    /// Execute the validate-artifacts command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Validating downloaded artifacts");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        match validate_artifacts(&config, self.force).await {
            Ok(ValidationRun::AlreadyValidated) => {
                println!("✅ Artifacts already validated. Use --force to run again.");
                Ok(EXIT_OK)
            }
            Ok(ValidationRun::NotDrained { pending }) => {
                println!("⚠️  {pending} batches still pending. Use --force to validate anyway.");
                Ok(EXIT_OK)
            }
            Ok(ValidationRun::Completed(report)) => {
                println!("{}", report.format_summary());
                Ok(EXIT_OK)
            }
            Err(e) => {
                tracing::error!(error = %e, "Artifact validation failed");
                println!("❌ Artifact validation failed");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

/// Validate the download directory and set `files_validated`
///
/// Skips work when the checkpoint already records a validation, or when the
/// export has not drained, unless `force` is set. A missing checkpoint is
/// treated as an empty one.
pub async fn validate_artifacts(
    config: &CatalogExportConfig,
    force: bool,
) -> Result<ValidationRun> {
    let storage = Arc::new(FileCheckpointStorage::new(&config.checkpoint.path));
    let manager = CheckpointManager::new(storage);
    let mut checkpoint = manager.load().await?;

    if !force {
        if checkpoint.files_validated {
            return Ok(ValidationRun::AlreadyValidated);
        }
        if !checkpoint.is_drained() {
            return Ok(ValidationRun::NotDrained {
                pending: checkpoint.pending_count(),
            });
        }
    }

    let report = MarcValidator::new(&config.export.artifact_extension)
        .validate_all(&config.export.download_dir)
        .await?;

    manager.mark_files_validated(&mut checkpoint, true).await?;
    Ok(ValidationRun::Completed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::core::checkpoint::{Batch, Checkpoint, CheckpointStorage};
    use crate::core::verification::marc::build_record;
    use crate::domain::IdRange;
    use chrono::Utc;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> CatalogExportConfig {
        let toml = format!(
            r#"
[catalog]
root_url = "https://catalog.example.org/api/v6"
username = "key"
password = "secret"

[last_id]
url = "https://catalog.example.org/last"

[export]
download_dir = "{}"

[checkpoint]
path = "{}"
"#,
            dir.path().join("downloads").display(),
            dir.path().join("tracker.json").display()
        );
        parse_config(&toml, |_| None).unwrap()
    }

    async fn write_drained_checkpoint(config: &CatalogExportConfig) {
        let mut checkpoint = Checkpoint::empty();
        checkpoint.last_known_id = Some(1_000_001);
        let mut batch = Batch::new(IdRange::new(1_000_000, 1_002_000), "catalog_export_0001.mrc");
        batch.completed_at = Some(Utc::now());
        checkpoint.batches.push(batch);
        FileCheckpointStorage::new(&config.checkpoint.path)
            .replace(&checkpoint)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_validates_and_marks_checkpoint() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        write_drained_checkpoint(&config).await;

        std::fs::create_dir_all(&config.export.download_dir).unwrap();
        std::fs::write(
            config.export.download_dir.join("catalog_export_0001.mrc"),
            build_record(&[("001", b"b1000000")]),
        )
        .unwrap();

        let run = validate_artifacts(&config, false).await.unwrap();
        match run {
            ValidationRun::Completed(report) => assert!(report.is_success()),
            other => panic!("unexpected run {other:?}"),
        }

        let stored = FileCheckpointStorage::new(&config.checkpoint.path)
            .read()
            .await
            .unwrap()
            .unwrap();
        assert!(stored.files_validated);

        let again = validate_artifacts(&config, false).await.unwrap();
        assert!(matches!(again, ValidationRun::AlreadyValidated));
    }

    #[tokio::test]
    async fn test_pending_batches_skip_validation() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let mut checkpoint = Checkpoint::empty();
        checkpoint.last_known_id = Some(1_000_001);
        checkpoint.batches.push(Batch::new(
            IdRange::new(1_000_000, 1_002_000),
            "catalog_export_0001.mrc",
        ));
        FileCheckpointStorage::new(&config.checkpoint.path)
            .replace(&checkpoint)
            .await
            .unwrap();

        let run = validate_artifacts(&config, false).await.unwrap();
        assert!(matches!(run, ValidationRun::NotDrained { pending: 1 }));
    }
}
