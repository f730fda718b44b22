//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "catalog-export.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing catalog-export configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set CATALOG_API_KEY and CATALOG_API_SECRET");
                println!("  3. Validate configuration: catalog-export validate-config");
                println!("  4. Run export: catalog-export export");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

/// Sample configuration written by `init`
pub fn sample_config() -> &'static str {
    r#"# catalog-export configuration
#
# Values of the form ${NAME} are read from the environment (or a .env file).
# Any key can also be overridden with CATALOG_EXPORT_<SECTION>_<KEY>,
# e.g. CATALOG_EXPORT_EXPORT_CHUNK_SIZE=1000.

# development | staging | production
environment = "development"

[application]
# trace, debug, info, warn, error
log_level = "info"

[catalog]
# API root; the paths below are relative to it
root_url = "https://catalog.example.org/iii/sierra-api/v6"
username = "${CATALOG_API_KEY}"
password = "${CATALOG_API_SECRET}"
token_path = "token"
export_path = "bibs/marc"
mapping = "toc"
tls_verify = true
token_timeout_seconds = 20
export_timeout_seconds = 30
download_timeout_seconds = 60

[last_id]
# url: read entries[0].id from a lookup URL
# scan: page through records created in the last scan_lookback_days
strategy = "url"
url = "https://catalog.example.org/last-bib-id"
# scan_path = "bibs/"
# scan_lookback_days = 7

[export]
range_start = 1000000
# At most 2000, the endpoint's page-size ceiling
chunk_size = 2000
loop_duration_minutes = 50
download_dir = "downloads"
artifact_prefix = "catalog_export"
artifact_extension = "mrc"

[checkpoint]
path = "tracker.json"

[logging]
local_enabled = false
local_path = "logs"
# daily | hourly
local_rotation = "daily"
"#
}
