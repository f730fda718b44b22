//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CatalogExportConfig, Environment, LastIdStrategy};
use super::secret::secret_string;
use crate::domain::errors::CatalogError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "CATALOG_EXPORT";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`CatalogExportConfig`]
/// 4. Applies environment variable overrides (`CATALOG_EXPORT_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`CatalogError::Configuration`] if the file is missing or unreadable,
/// a referenced variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use catalog_export::config::loader::load_config;
///
/// let config = load_config("catalog-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CatalogExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CatalogError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CatalogError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents, |key| std::env::var(key).ok())
}

/// Parses configuration text, resolving variables through `lookup`
///
/// `lookup` serves both `${VAR}` substitution and `CATALOG_EXPORT_*` overrides.
pub fn parse_config<F>(contents: &str, lookup: F) -> Result<CatalogExportConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let contents = substitute_env_vars(contents, &lookup)?;

    let mut config: CatalogExportConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config, &lookup)?;

    config.validate().map_err(|e| {
        CatalogError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes variables in the format `${VAR_NAME}`
///
/// Comment lines are passed through untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars<F>(input: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CatalogError::Other(format!("invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match lookup(var_name) {
                Some(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                None => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(CatalogError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| CatalogError::Configuration(format!("Invalid value for {key}: {e}")))
}

/// Applies overrides of the form `CATALOG_EXPORT_<SECTION>_<KEY>`
///
/// For example `CATALOG_EXPORT_CATALOG_ROOT_URL` or `CATALOG_EXPORT_EXPORT_CHUNK_SIZE`.
fn apply_env_overrides<F>(config: &mut CatalogExportConfig, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        let key = format!("{ENV_PREFIX}_{name}");
        lookup(&key).map(|value| (key, value))
    };

    // Application overrides
    if let Some((_, val)) = var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some((key, val)) = var("ENVIRONMENT") {
        config.environment = match val.as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(CatalogError::Configuration(format!(
                    "Invalid value for {key}: '{other}'"
                )))
            }
        };
    }

    // Catalog overrides
    if let Some((_, val)) = var("CATALOG_ROOT_URL") {
        config.catalog.root_url = val;
    }
    if let Some((_, val)) = var("CATALOG_USERNAME") {
        config.catalog.username = val;
    }
    if let Some((_, val)) = var("CATALOG_PASSWORD") {
        config.catalog.password = secret_string(val);
    }
    if let Some((key, val)) = var("CATALOG_TLS_VERIFY") {
        config.catalog.tls_verify = parse_override(&key, &val)?;
    }
    if let Some((key, val)) = var("CATALOG_EXPORT_TIMEOUT_SECONDS") {
        config.catalog.export_timeout_seconds = parse_override(&key, &val)?;
    }
    if let Some((key, val)) = var("CATALOG_DOWNLOAD_TIMEOUT_SECONDS") {
        config.catalog.download_timeout_seconds = parse_override(&key, &val)?;
    }

    // Last-ID overrides
    if let Some((key, val)) = var("LAST_ID_STRATEGY") {
        config.last_id.strategy = match val.as_str() {
            "url" => LastIdStrategy::Url,
            "scan" => LastIdStrategy::Scan,
            other => {
                return Err(CatalogError::Configuration(format!(
                    "Invalid value for {key}: '{other}' (expected 'url' or 'scan')"
                )))
            }
        };
    }
    if let Some((_, val)) = var("LAST_ID_URL") {
        config.last_id.url = Some(val);
    }

    // Export overrides
    if let Some((key, val)) = var("EXPORT_RANGE_START") {
        config.export.range_start = parse_override(&key, &val)?;
    }
    if let Some((key, val)) = var("EXPORT_CHUNK_SIZE") {
        config.export.chunk_size = parse_override(&key, &val)?;
    }
    if let Some((key, val)) = var("EXPORT_LOOP_DURATION_MINUTES") {
        config.export.loop_duration_minutes = parse_override(&key, &val)?;
    }
    if let Some((_, val)) = var("EXPORT_DOWNLOAD_DIR") {
        config.export.download_dir = PathBuf::from(val);
    }

    // Checkpoint overrides
    if let Some((_, val)) = var("CHECKPOINT_PATH") {
        config.checkpoint.path = PathBuf::from(val);
    }

    // Logging overrides
    if let Some((key, val)) = var("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override(&key, &val)?;
    }
    if let Some((_, val)) = var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
