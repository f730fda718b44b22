//! Configuration management for catalog-export.
//!
//! Configuration is read from a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CATALOG_EXPORT_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use catalog_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("catalog-export.toml")?;
//!
//! println!("Catalog API: {}", config.catalog.root_url);
//! println!("Chunk size: {}", config.export.chunk_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`CatalogConfig`] - API root, credentials, endpoint paths and timeouts
//! - [`LastIdConfig`] - How the highest record ID is discovered
//! - [`ExportConfig`] - Range start, chunk size, run budget, artifact naming
//! - [`CheckpointConfig`] - Checkpoint file location
//! - [`LoggingConfig`] - Optional JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [catalog]
//! root_url = "https://catalog.example.edu/iii/sierra-api/v6/"
//! username = "${CATALOG_API_KEY}"
//! password = "${CATALOG_API_SECRET}"
//!
//! [last_id]
//! strategy = "url"
//! url = "https://catalog.example.edu/lastbib.json"
//!
//! [export]
//! range_start = 1000000
//! chunk_size = 2000
//! loop_duration_minutes = 50
//! download_dir = "downloads"
//!
//! [checkpoint]
//! path = "tracker.json"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CatalogConfig, CatalogExportConfig, CheckpointConfig, Environment,
    ExportConfig, LastIdConfig, LastIdStrategy, LoggingConfig, MAX_CHUNK_SIZE,
};
pub use secret::{secret_string, SecretString, SecretValue};
