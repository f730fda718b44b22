//! Artifact validation report

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A file that passed validation
#[derive(Debug, Clone, Serialize)]
pub struct ValidFile {
    pub name: String,
    pub records: usize,
    pub bytes: u64,
    pub sha256: String,
}

/// A file that failed validation and was quarantined
#[derive(Debug, Clone, Serialize)]
pub struct InvalidFile {
    pub name: String,
    /// New name after the extension was changed to `.txt`
    pub renamed_to: String,
    pub bytes: u64,
    pub reason: String,
}

/// Result of validating a download directory
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// When validation ran
    pub validated_at: DateTime<Utc>,

    /// Files that passed
    pub valid: Vec<ValidFile>,

    /// Files that failed
    pub invalid: Vec<InvalidFile>,

    /// Duration of validation in milliseconds
    pub duration_ms: u64,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            validated_at: Utc::now(),
            valid: Vec::new(),
            invalid: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Number of files examined
    pub fn files_checked(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    /// Total records across valid files
    pub fn total_records(&self) -> usize {
        self.valid.iter().map(|f| f.records).sum()
    }

    /// Check if every file passed
    pub fn is_success(&self) -> bool {
        self.invalid.is_empty()
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Artifact Validation Report\n");
        summary.push_str("==========================\n");
        summary.push_str(&format!("Files checked: {}\n", self.files_checked()));
        summary.push_str(&format!(
            "Valid:         {} ({} records)\n",
            self.valid.len(),
            self.total_records()
        ));
        summary.push_str(&format!("Invalid:       {}\n", self.invalid.len()));
        summary.push_str(&format!("Duration:      {} ms\n", self.duration_ms));

        if !self.invalid.is_empty() {
            summary.push_str("\nQuarantined files:\n");
            for file in &self.invalid {
                summary.push_str(&format!(
                    "  {} -> {} ({} bytes): {}\n",
                    file.name, file.renamed_to, file.bytes, file.reason
                ));
            }
        }

        summary
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
