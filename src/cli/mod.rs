//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for catalog-export using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Exit code for a run that completed, drained or ran out of time
pub const EXIT_OK: i32 = 0;
/// Exit code for a missing or invalid configuration
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for a run halted by the remote rate limit
pub const EXIT_RATE_LIMITED: i32 = 3;
/// Exit code for authentication or last-ID lookup failures
pub const EXIT_UPSTREAM: i32 = 4;
/// Exit code for everything else
pub const EXIT_FATAL: i32 = 5;
/// Exit code after SIGINT/SIGTERM
pub const EXIT_INTERRUPTED: i32 = 130;

/// catalog-export - Checkpointed catalog MARC export
#[derive(Parser, Debug)]
#[command(name = "catalog-export")]
#[command(version, about, long_about = None)]
#[command(author = "Catalog Export Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "catalog-export.toml",
        env = "CATALOG_EXPORT_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CATALOG_EXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export pending batches until drained or out of time
    Export(commands::export::ExportArgs),

    /// Show checkpoint progress
    Status(commands::status::StatusArgs),

    /// Check downloaded artifacts are MARC and quarantine the rest
    ValidateArtifacts(commands::validate_artifacts::ValidateArtifactsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
