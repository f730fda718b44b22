//! Core business logic for catalog-export.
//!
//! # Modules
//!
//! - [`checkpoint`] - Durable record of planned and completed batches
//! - [`planner`] - Splitting the ID space into batches
//! - [`export`] - Fetching batches and the time-boxed scheduling loop
//! - [`verification`] - MARC validation of downloaded artifacts
//!
//! # Export Workflow
//!
//! 1. **Load**: read the checkpoint, or create an empty one
//! 2. **Resolve**: ask the catalog for its highest record ID, once
//! 3. **Plan**: split `[range_start, last_known_id]` into batches, once
//! 4. **Loop**: fetch the first pending batch, save its artifact, mark it completed
//! 5. **Stop**: when drained, out of time, interrupted, or on a hard failure
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_export::adapters::catalog::{last_id_source, BasicAuthTokenProvider, CatalogClient};
//! use catalog_export::config::load_config;
//! use catalog_export::core::checkpoint::{CheckpointManager, FileCheckpointStorage};
//! use catalog_export::core::export::{
//!     ArtifactStore, BatchScheduler, ExportFetcher, PlanSettings,
//! };
//! use catalog_export::core::planner::ArtifactNaming;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("catalog-export.toml")?;
//! let client = CatalogClient::new(&config.catalog)?;
//! let tokens = Arc::new(BasicAuthTokenProvider::new(client.clone(), &config.catalog)?);
//!
//! let scheduler = BatchScheduler::new(
//!     CheckpointManager::new(Arc::new(FileCheckpointStorage::new(&config.checkpoint.path))),
//!     last_id_source(&config, client.clone(), tokens.clone())?,
//!     Box::new(ExportFetcher::new(
//!         client,
//!         tokens,
//!         ArtifactStore::new(&config.export.download_dir),
//!         &config.catalog,
//!     )?),
//!     PlanSettings {
//!         range_start: config.export.range_start,
//!         chunk_size: config.export.chunk_size,
//!         naming: ArtifactNaming::new(
//!             &config.export.artifact_prefix,
//!             &config.export.artifact_extension,
//!         ),
//!     },
//!     tokio::sync::watch::channel(false).1,
//! );
//!
//! let summary = scheduler
//!     .run(Duration::from_secs(config.export.loop_duration_minutes * 60))
//!     .await?;
//! println!("Stopped: {}", summary.stop_reason);
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;
pub mod export;
pub mod planner;
pub mod verification;
