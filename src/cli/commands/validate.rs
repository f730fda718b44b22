//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the catalog-export configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_OK};
use crate::config::{load_config, LastIdStrategy};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading runs substitution, overrides and validation in one step.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Catalog Root: {}", config.catalog.root_url);
        println!("  API Key: {}", config.catalog.username);
        println!("  TLS Verify: {}", config.catalog.tls_verify);
        match config.last_id.strategy {
            LastIdStrategy::Url => println!(
                "  Last ID Source: url ({})",
                config.last_id.url.as_deref().unwrap_or_default()
            ),
            LastIdStrategy::Scan => println!(
                "  Last ID Source: scan ({}, {} days back)",
                config.last_id.scan_path, config.last_id.scan_lookback_days
            ),
        }
        println!("  Range Start: {}", config.export.range_start);
        println!("  Chunk Size: {}", config.export.chunk_size);
        println!(
            "  Loop Duration: {} min",
            config.export.loop_duration_minutes
        );
        println!("  Download Dir: {}", config.export.download_dir.display());
        println!("  Checkpoint: {}", config.checkpoint.path.display());
        println!();
        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_invalid_chunk_size_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            r#"
[catalog]
root_url = "https://catalog.example.org/iii/sierra-api/v6"
username = "key"
password = "secret"

[last_id]
url = "https://catalog.example.org/last"

[export]
chunk_size = 5000
download_dir = "downloads"
"#,
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
