// catalog-export - Checkpointed catalog MARC export
// Copyright (c) 2025 Catalog Export Contributors
// Licensed under the MIT License

//! # catalog-export - Checkpointed catalog MARC export
//!
//! catalog-export bulk-downloads MARC records from a remote library catalog API
//! whose export endpoint only accepts bounded ID ranges, is rate limited, and
//! sometimes fails on individual ranges.
//!
//! ## Overview
//!
//! The crate provides:
//! - **Planning** the ID space `[range_start, last_known_id]` into fixed-width batches
//! - **Fetching** one batch per request and saving the returned artifact
//! - **Checkpointing** progress to a JSON file after every batch, so any run can resume
//! - **Scheduling** a time-boxed loop that stops cleanly on the deadline, a signal,
//!   or the remote rate limit
//! - **Validating** downloaded artifacts as MARC once the export is drained
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Checkpoint, planner, fetcher, scheduler, validation
//! - [`adapters`] - Remote catalog API (tokens, last-ID lookup)
//! - [`domain`] - Errors and ID ranges
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_export::cli::commands::export::build_scheduler;
//! use catalog_export::config::load_config;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("catalog-export.toml")?;
//!     let (_tx, shutdown) = tokio::sync::watch::channel(false);
//!
//!     let scheduler = build_scheduler(&config, shutdown)?;
//!     let summary = scheduler.run(Duration::from_secs(50 * 60)).await?;
//!
//!     println!("{} batches still pending: {}", summary.pending, summary.stop_reason);
//!     Ok(())
//! }
//! ```
//!
//! ## Outcomes
//!
//! Every batch ends in one of three ways:
//!
//! - **Success**: the response pointed at a file, which was downloaded
//! - **Soft success**: the range is empty or hit a known transient remote
//!   failure; the raw response is saved as the artifact and the batch is done
//! - **Hard failure**: the run stops and the batch stays pending
//!
//! ## Logging
//!
//! catalog-export uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(range = "[1000000,1002000)", "Fetching batch");
//! warn!(status = 500, "Remote error");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
