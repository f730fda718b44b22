//! Export command implementation
//!
//! Runs one time-boxed scheduler pass against the checkpoint.

use crate::adapters::catalog::{last_id_source, BasicAuthTokenProvider, CatalogClient, TokenProvider};
use crate::cli::{
    EXIT_CONFIG, EXIT_FATAL, EXIT_INTERRUPTED, EXIT_OK, EXIT_RATE_LIMITED, EXIT_UPSTREAM,
};
use crate::config::{load_config, CatalogExportConfig};
use crate::core::checkpoint::{CheckpointManager, FileCheckpointStorage};
use crate::core::export::{
    ArtifactStore, BatchScheduler, ExportFetcher, PlanSettings, StopReason,
};
use crate::core::planner::ArtifactNaming;
use crate::domain::{CatalogError, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Override `export.loop_duration_minutes` for this run
    #[arg(long)]
    pub duration_minutes: Option<u64>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting export command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let minutes = self
            .duration_minutes
            .unwrap_or(config.export.loop_duration_minutes);

        let scheduler = match build_scheduler(&config, shutdown_signal) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize export");
                eprintln!("❌ Failed to initialize export: {e}");
                return Ok(exit_code_for_error(&e));
            }
        };

        println!("🚀 Starting export (time budget {minutes} min)...");
        println!();

        let budget = Duration::from_secs(minutes.saturating_mul(60));
        let summary = match scheduler.run(budget).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed before processing batches");
                eprintln!("❌ Export failed: {e}");
                return Ok(exit_code_for_error(&e));
            }
        };

        println!("📊 Export Summary:");
        println!("  Planned Batches: {}", summary.total_batches);
        println!("  Attempted: {}", summary.batches_attempted);
        println!("  Completed: {}", summary.batches_completed);
        println!("  Soft Successes: {}", summary.soft_successes);
        println!("  Bytes Written: {}", summary.bytes_written);
        println!("  Still Pending: {}", summary.pending);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        let exit_code = exit_code_for_stop(&summary.stop_reason);
        match &summary.stop_reason {
            StopReason::Drained => println!("✅ All batches completed"),
            StopReason::DeadlineReached => {
                println!("⏱️  Time budget reached. Run again to continue.")
            }
            StopReason::Interrupted => {
                println!("⚠️  Export interrupted gracefully. Progress saved.");
                println!("   Run the same command to resume from checkpoint.");
            }
            StopReason::Halted(failure) => {
                println!("⚠️  Halted by remote rate limit on batch {}", failure.range);
                println!("   The batch stays pending and is retried on the next run.");
            }
            StopReason::Failed(error) => println!("❌ Export stopped: {error}"),
        }

        Ok(exit_code)
    }
}

/// Wire the scheduler from configuration
pub fn build_scheduler(
    config: &CatalogExportConfig,
    shutdown_signal: watch::Receiver<bool>,
) -> Result<BatchScheduler> {
    let client = CatalogClient::new(&config.catalog)?;
    let tokens: Arc<dyn TokenProvider> =
        Arc::new(BasicAuthTokenProvider::new(client.clone(), &config.catalog)?);

    let last_id = last_id_source(config, client.clone(), tokens.clone())?;
    let fetcher = ExportFetcher::new(
        client,
        tokens,
        ArtifactStore::new(&config.export.download_dir),
        &config.catalog,
    )?;

    let storage = Arc::new(FileCheckpointStorage::new(&config.checkpoint.path));

    Ok(BatchScheduler::new(
        CheckpointManager::new(storage),
        last_id,
        Box::new(fetcher),
        PlanSettings {
            range_start: config.export.range_start,
            chunk_size: config.export.chunk_size,
            naming: ArtifactNaming::new(
                &config.export.artifact_prefix,
                &config.export.artifact_extension,
            ),
        },
        shutdown_signal,
    ))
}

/// Exit code for a run that reached the batch loop
pub fn exit_code_for_stop(reason: &StopReason) -> i32 {
    match reason {
        StopReason::Drained | StopReason::DeadlineReached => EXIT_OK,
        StopReason::Interrupted => EXIT_INTERRUPTED,
        StopReason::Halted(_) => EXIT_RATE_LIMITED,
        StopReason::Failed(error) => match error {
            CatalogError::Authentication(_) => EXIT_UPSTREAM,
            _ if error.is_rate_limited() => EXIT_RATE_LIMITED,
            _ => EXIT_FATAL,
        },
    }
}

/// Exit code for a failure before the batch loop started
pub fn exit_code_for_error(error: &CatalogError) -> i32 {
    match error {
        CatalogError::Configuration(_) => EXIT_CONFIG,
        CatalogError::Authentication(_) | CatalogError::UpstreamUnavailable(_) => EXIT_UPSTREAM,
        _ if error.is_rate_limited() => EXIT_RATE_LIMITED,
        _ => EXIT_FATAL,
    }
}
