//! Status command implementation
//!
//! Prints checkpoint progress without contacting the catalog.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use crate::config::load_config;
use crate::core::checkpoint::{Checkpoint, CheckpointManager, FileCheckpointStorage};
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// List every pending batch
    #[arg(long)]
    pub pending: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        println!("📊 Export Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let storage = Arc::new(FileCheckpointStorage::new(&config.checkpoint.path));
        let manager = CheckpointManager::new(storage);

        let checkpoint = match manager.read_existing().await {
            Ok(Some(c)) => c,
            Ok(None) => {
                println!(
                    "No checkpoint at {}. Run `catalog-export export` to start.",
                    config.checkpoint.path.display()
                );
                return Ok(EXIT_OK);
            }
            Err(e) => {
                println!("❌ Failed to read checkpoint");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        print!("{}", render_status(&checkpoint, self.pending));
        Ok(EXIT_OK)
    }
}

fn render_status(checkpoint: &Checkpoint, list_pending: bool) -> String {
    let mut out = String::new();
    let last_known = checkpoint
        .last_known_id
        .map_or_else(|| "not resolved".to_string(), |id| id.to_string());

    out.push_str(&format!("  Last Known ID: {last_known}\n"));
    out.push_str(&format!("  Planned Batches: {}\n", checkpoint.batches.len()));
    out.push_str(&format!("  Completed: {}\n", checkpoint.completed_count()));
    out.push_str(&format!("  Pending: {}\n", checkpoint.pending_count()));
    out.push_str(&format!(
        "  Files Validated: {}\n",
        if checkpoint.files_validated { "yes" } else { "no" }
    ));
    out.push_str(&format!(
        "  Updated: {}\n",
        checkpoint.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(latest) = checkpoint
        .batches
        .iter()
        .filter_map(|b| b.completed_at.map(|at| (at, b)))
        .max_by_key(|(at, _)| *at)
    {
        out.push_str(&format!(
            "  Last Completed: {} at {}\n",
            latest.1.artifact_name,
            latest.0.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    if list_pending {
        out.push('\n');
        out.push_str("Pending batches:\n");
        for batch in checkpoint.batches.iter().filter(|b| !b.is_completed()) {
            out.push_str(&format!("  {} {}\n", batch.range(), batch.artifact_name));
        }
    }

    out
}
