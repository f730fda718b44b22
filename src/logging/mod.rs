//! Logging and observability
//!
//! Structured logging built on `tracing`:
//! - Console output with configurable level
//! - Optional JSON file logging with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use catalog_export::logging::init_logging;
//! use catalog_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a batch that finished, successfully or with a soft outcome
///
/// # Example
///
/// ```no_run
/// use catalog_export::log_batch_complete;
/// use catalog_export::domain::IdRange;
///
/// let range = IdRange::new(1_000_000, 1_002_000);
/// log_batch_complete!(1, &range, "success");
/// ```
#[macro_export]
macro_rules! log_batch_complete {
    ($ordinal:expr, $range:expr, $outcome:expr) => {
        tracing::info!(
            ordinal = $ordinal,
            range = %$range,
            outcome = $outcome,
            "Batch completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use catalog_export::log_error_with_context;
/// use catalog_export::domain::CatalogError;
///
/// let error = CatalogError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
