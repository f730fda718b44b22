//! Domain error types
//!
//! This module defines the error hierarchy for catalog-export.
//! All errors are domain-specific and don't expose third-party types.

use super::range::IdRange;
use thiserror::Error;

/// Maximum number of raw response bytes kept on a [`HardFailure`]
pub const RAW_BODY_LIMIT: usize = 512;

/// Main catalog-export error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The persisted checkpoint exists but cannot be used
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Bearer token acquisition failed
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The "current last ID" collaborator could not answer
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A batch fetch ended in a hard failure
    #[error("Fetch error: {0}")]
    Fetch(#[from] HardFailure),

    /// State management errors
    #[error("State management error: {0}")]
    State(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CatalogError {
    /// Whether this error is the remote service's global throttle
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CatalogError::Fetch(failure) if failure.is_rate_limited())
    }
}

/// A remote or transport condition that aborts the run
///
/// The batch stays pending so it is retried on a later invocation.
#[derive(Debug, Error)]
#[error("batch {range} failed: {kind}")]
pub struct HardFailure {
    /// ID range of the batch being fetched
    pub range: IdRange,

    /// What went wrong
    pub kind: HardFailureKind,
}

impl HardFailure {
    /// Create a new hard failure for a batch range
    pub fn new(range: IdRange, kind: HardFailureKind) -> Self {
        Self { range, kind }
    }

    /// Check if the remote service signaled its rate limit
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.kind, HardFailureKind::RateLimited { .. })
    }
}

/// Hard failure classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardFailureKind {
    /// HTTP 500 with error name "Rate exceeded for endpoint"
    #[error("rate limited by remote service: {body}")]
    RateLimited { body: String },

    /// HTTP 500 with an error name we don't recognise
    #[error("unhandled remote error '{name}': {body}")]
    UnhandledRemoteError { name: String, body: String },

    /// Any status other than 200 or 500
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Response could not be interpreted
    #[error("malformed response (status {status}): {reason}")]
    MalformedResponse { status: u16, reason: String },

    /// Timeout, connection failure and other transport-level errors
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-200 while downloading the artifact itself
    #[error("artifact download failed with status {status}: {body}")]
    DownloadFailed { status: u16, body: String },
}

/// Truncate a raw response body for diagnostics
pub fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.len() <= RAW_BODY_LIMIT {
        return trimmed.to_string();
    }
    let mut end = RAW_BODY_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

// Conversion from std::io::Error
impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_hard_failure_conversion() {
        let failure = HardFailure::new(
            IdRange::new(1_000_000, 1_002_000),
            HardFailureKind::Transport("connection reset".to_string()),
        );
        let err: CatalogError = failure.into();
        assert!(matches!(err, CatalogError::Fetch(_)));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_rate_limited_detection() {
        let failure = HardFailure::new(
            IdRange::new(1_000_000, 1_002_000),
            HardFailureKind::RateLimited {
                body: "{}".to_string(),
            },
        );
        assert!(failure.is_rate_limited());
        assert!(CatalogError::from(failure).is_rate_limited());
    }

    #[test]
    fn test_hard_failure_display_includes_range() {
        let failure = HardFailure::new(
            IdRange::new(1_002_000, 1_004_000),
            HardFailureKind::UnhandledRemoteError {
                name: "Invalid Parameter".to_string(),
                body: "{\"name\":\"Invalid Parameter\"}".to_string(),
            },
        );
        let message = failure.to_string();
        assert!(message.contains("[1002000,1004000)"));
        assert!(message.contains("Invalid Parameter"));
    }

    #[test]
    fn test_body_snippet_truncates() {
        let body = "x".repeat(RAW_BODY_LIMIT + 100);
        let snippet = body_snippet(body.as_bytes());
        assert_eq!(snippet.len(), RAW_BODY_LIMIT + 3);
        assert!(snippet.ends_with("..."));

        assert_eq!(body_snippet(b"  short  "), "short");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: CatalogError = io_err.into();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: CatalogError = json_err.into();
        assert!(matches!(err, CatalogError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: CatalogError = toml_err.into();
        assert!(matches!(err, CatalogError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
