//! Configuration schema types
//!
//! This module defines the configuration structure for catalog-export.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest page the export endpoint will return in one response
pub const MAX_CHUNK_SIZE: u64 = 2000;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main catalog-export configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Remote catalog API connection
    pub catalog: CatalogConfig,

    /// How the highest record ID is discovered
    #[serde(default)]
    pub last_id: LastIdConfig,

    /// Batch planning and download settings
    pub export: ExportConfig,

    /// Checkpoint persistence
    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CatalogExportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.catalog.validate(&self.environment)?;
        self.last_id.validate()?;
        self.export.validate()?;
        self.checkpoint.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Remote catalog API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// API root URL; relative endpoint paths are joined onto it
    pub root_url: String,

    /// API key used for HTTP Basic auth against the token endpoint
    pub username: String,

    /// API secret
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Token endpoint, relative to `root_url`
    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Range-export endpoint, relative to `root_url`
    #[serde(default = "default_export_path")]
    pub export_path: String,

    /// Value of the `mapping` query parameter sent with export requests
    #[serde(default = "default_mapping")]
    pub mapping: String,

    /// TLS certificate verification enabled
    ///
    /// Cannot be disabled in production environments.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Timeout for the token request
    #[serde(default = "default_token_timeout_seconds")]
    pub token_timeout_seconds: u64,

    /// Timeout for the range-export request
    #[serde(default = "default_export_timeout_seconds")]
    pub export_timeout_seconds: u64,

    /// Timeout for downloading one artifact
    #[serde(default = "default_download_timeout_seconds")]
    pub download_timeout_seconds: u64,
}

impl CatalogConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.root_url.is_empty() {
            return Err("catalog.root_url cannot be empty".to_string());
        }

        if !self.root_url.starts_with("http://") && !self.root_url.starts_with("https://") {
            return Err("catalog.root_url must start with http:// or https://".to_string());
        }

        url::Url::parse(&self.root_url)
            .map_err(|e| format!("catalog.root_url is not a valid URL: {e}"))?;

        if self.username.is_empty() {
            return Err("catalog.username cannot be empty".to_string());
        }

        if self.password.expose_secret().is_empty() {
            return Err("catalog.password cannot be empty".to_string());
        }

        if self.token_path.is_empty() || self.export_path.is_empty() {
            return Err("catalog.token_path and catalog.export_path cannot be empty".to_string());
        }

        for (name, value) in [
            ("token_timeout_seconds", self.token_timeout_seconds),
            ("export_timeout_seconds", self.export_timeout_seconds),
            ("download_timeout_seconds", self.download_timeout_seconds),
        ] {
            if value == 0 {
                return Err(format!("catalog.{name} must be > 0"));
            }
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'tls_verify = true' or use 'environment = \"development\"' for testing."
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Root URL with a guaranteed trailing slash, so relative joins keep the API prefix
    pub fn root(&self) -> Result<url::Url, String> {
        let mut root = self.root_url.clone();
        if !root.ends_with('/') {
            root.push('/');
        }
        url::Url::parse(&root).map_err(|e| format!("catalog.root_url is not a valid URL: {e}"))
    }
}

/// Strategy for discovering the highest record ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LastIdStrategy {
    /// Read `entries[0].id` from a fixed lookup URL
    #[default]
    Url,
    /// Page through recently created records until a short page is returned
    Scan,
}

/// Last-ID discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastIdConfig {
    /// Discovery strategy
    #[serde(default)]
    pub strategy: LastIdStrategy,

    /// Lookup URL (required for the `url` strategy)
    #[serde(default)]
    pub url: Option<String>,

    /// Listing endpoint for the `scan` strategy, relative to `catalog.root_url`
    #[serde(default = "default_scan_path")]
    pub scan_path: String,

    /// How many days back the `scan` strategy starts from
    #[serde(default = "default_scan_lookback_days")]
    pub scan_lookback_days: u32,
}

impl LastIdConfig {
    fn validate(&self) -> Result<(), String> {
        match self.strategy {
            LastIdStrategy::Url => match self.url.as_deref() {
                None | Some("") => {
                    Err("last_id.url is required when last_id.strategy = 'url'".to_string())
                }
                Some(url) => url::Url::parse(url)
                    .map(|_| ())
                    .map_err(|e| format!("last_id.url is not a valid URL: {e}")),
            },
            LastIdStrategy::Scan => {
                if self.scan_path.is_empty() {
                    return Err("last_id.scan_path cannot be empty".to_string());
                }
                if self.scan_lookback_days == 0 {
                    return Err("last_id.scan_lookback_days must be > 0".to_string());
                }
                Ok(())
            }
        }
    }
}

impl Default for LastIdConfig {
    fn default() -> Self {
        Self {
            strategy: LastIdStrategy::default(),
            url: None,
            scan_path: default_scan_path(),
            scan_lookback_days: default_scan_lookback_days(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// First record ID of the exported range
    #[serde(default = "default_range_start")]
    pub range_start: u64,

    /// IDs per batch; bounded by the endpoint's page-size ceiling
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Wall-clock budget for one run of the scheduling loop
    #[serde(default = "default_loop_duration_minutes")]
    pub loop_duration_minutes: u64,

    /// Directory artifacts are written to
    pub download_dir: PathBuf,

    /// Artifact file name prefix
    #[serde(default = "default_artifact_prefix")]
    pub artifact_prefix: String,

    /// Artifact file extension
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(format!(
                "export.chunk_size must be between 1 and {MAX_CHUNK_SIZE}, got {}",
                self.chunk_size
            ));
        }

        if self.loop_duration_minutes == 0 {
            return Err("export.loop_duration_minutes must be > 0".to_string());
        }

        if self.download_dir.as_os_str().is_empty() {
            return Err("export.download_dir cannot be empty".to_string());
        }

        if self.artifact_prefix.is_empty()
            || self.artifact_prefix.contains(['/', '\\'])
            || self.artifact_extension.is_empty()
            || self.artifact_extension.contains(['/', '\\', '.'])
        {
            return Err(
                "export.artifact_prefix and export.artifact_extension must be non-empty \
                 file name parts"
                    .to_string(),
            );
        }

        Ok(())
    }
}

/// Checkpoint persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Path of the JSON checkpoint file
    #[serde(default = "default_checkpoint_path")]
    pub path: PathBuf,
}

impl CheckpointConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("checkpoint.path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            path: default_checkpoint_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".into());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_token_path() -> String {
    "token".to_string()
}

fn default_export_path() -> String {
    "bibs/marc".to_string()
}

fn default_mapping() -> String {
    "toc".to_string()
}

fn default_token_timeout_seconds() -> u64 {
    20
}

fn default_export_timeout_seconds() -> u64 {
    30
}

fn default_download_timeout_seconds() -> u64 {
    60
}

fn default_scan_path() -> String {
    "bibs/".to_string()
}

fn default_scan_lookback_days() -> u32 {
    7
}

fn default_range_start() -> u64 {
    1_000_000
}

fn default_chunk_size() -> u64 {
    MAX_CHUNK_SIZE
}

fn default_loop_duration_minutes() -> u64 {
    50
}

fn default_artifact_prefix() -> String {
    "catalog_export".to_string()
}

fn default_artifact_extension() -> String {
    "mrc".to_string()
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("tracker.json")
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
