//! Batch export
//!
//! - [`classify`] - Mapping of range-export responses to outcomes
//! - [`artifact`] - Atomic artifact files with checksums
//! - [`fetcher`] - One batch: token, request, classify, persist
//! - [`scheduler`] - Time-boxed sequential loop over pending batches
//! - [`summary`] - Run summary and stop reasons

pub mod artifact;
pub mod classify;
pub mod fetcher;
pub mod scheduler;
pub mod summary;

pub use artifact::{ArtifactRecord, ArtifactStore};
pub use classify::{classify_response, Classification, SoftReason};
pub use fetcher::{BatchFetcher, ExportFetcher, FetchOutcome};
pub use scheduler::{BatchScheduler, Deadline, PlanSettings, WallClockDeadline};
pub use summary::{RunSummary, StopReason};
