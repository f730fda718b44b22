//! Range-export response classification
//!
//! Maps the status and body of a range-export response to what the fetcher
//! must do next. The mapping is pure so it can be checked exhaustively
//! without a server.

use crate::adapters::catalog::models::{ExportResponse, RemoteError};
use crate::domain::{body_snippet, HardFailureKind};
use std::fmt;

/// Remote error name for a failure that will not go away on retry
pub const EXTERNAL_PROCESS_FAILED: &str = "External Process Failed";

/// Remote error name for the service-wide throttle
pub const RATE_EXCEEDED: &str = "Rate exceeded for endpoint";

/// Why a batch was completed without a downloaded artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftReason {
    /// The remote reported zero records for the range
    EmptyRange,
    /// The remote's export job failed in a way known to be permanent for this range
    KnownTransient,
}

impl SoftReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoftReason::EmptyRange => "empty_range",
            SoftReason::KnownTransient => "known_transient",
        }
    }
}

impl fmt::Display for SoftReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a range-export response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Download the artifact at `file_url`
    Download { file_url: String },
    /// Save the raw response body as the artifact and mark the batch done
    Soft(SoftReason),
    /// Stop the run; the batch stays pending
    Hard(HardFailureKind),
}

/// Classify a range-export response
///
/// ```
/// use catalog_export::core::export::classify::{classify_response, Classification, SoftReason};
///
/// assert_eq!(
///     classify_response(200, br#"{"outputRecords": 0}"#),
///     Classification::Soft(SoftReason::EmptyRange)
/// );
/// ```
pub fn classify_response(status: u16, body: &[u8]) -> Classification {
    match status {
        200 => classify_ok(body),
        500 => classify_server_error(body),
        other => Classification::Hard(HardFailureKind::UnexpectedStatus {
            status: other,
            body: body_snippet(body),
        }),
    }
}

fn classify_ok(body: &[u8]) -> Classification {
    let parsed: ExportResponse = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Classification::Hard(HardFailureKind::MalformedResponse {
                status: 200,
                reason: format!("body is not an export response: {e}"),
            })
        }
    };

    if parsed.output_records == Some(0) {
        return Classification::Soft(SoftReason::EmptyRange);
    }

    match parsed.file {
        Some(file_url) if !file_url.trim().is_empty() => Classification::Download {
            file_url: file_url.trim().to_string(),
        },
        _ => Classification::Hard(HardFailureKind::MalformedResponse {
            status: 200,
            reason: "response has neither outputRecords = 0 nor a file URL".to_string(),
        }),
    }
}

fn classify_server_error(body: &[u8]) -> Classification {
    let error: RemoteError = match serde_json::from_slice(body) {
        Ok(error) => error,
        Err(e) => {
            return Classification::Hard(HardFailureKind::MalformedResponse {
                status: 500,
                reason: format!("error body has no readable name: {e}"),
            })
        }
    };

    match error.name.as_str() {
        EXTERNAL_PROCESS_FAILED => Classification::Soft(SoftReason::KnownTransient),
        RATE_EXCEEDED => Classification::Hard(HardFailureKind::RateLimited {
            body: body_snippet(body),
        }),
        _ => Classification::Hard(HardFailureKind::UnhandledRemoteError {
            name: error.name,
            body: body_snippet(body),
        }),
    }
}
