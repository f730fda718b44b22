//! Run summary and reporting

use crate::domain::{CatalogError, HardFailure};
use std::fmt;
use std::time::Duration;

/// Why the scheduling loop stopped
#[derive(Debug)]
pub enum StopReason {
    /// Every planned batch is completed
    Drained,
    /// The run's time budget ran out between batches
    DeadlineReached,
    /// A shutdown signal was received between batches
    Interrupted,
    /// The remote service throttled us; retry on the next invocation
    Halted(HardFailure),
    /// Any other failure while processing a batch
    Failed(CatalogError),
}

impl StopReason {
    /// Whether the run ended without a batch failure
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            StopReason::Drained | StopReason::DeadlineReached | StopReason::Interrupted
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Drained => f.write_str("all batches completed"),
            StopReason::DeadlineReached => f.write_str("run time budget reached"),
            StopReason::Interrupted => f.write_str("interrupted by shutdown signal"),
            StopReason::Halted(failure) => write!(f, "halted: {failure}"),
            StopReason::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

/// Summary of one scheduler run
#[derive(Debug)]
pub struct RunSummary {
    /// Batches in the plan
    pub total_batches: usize,

    /// Batches fetched in this run
    pub batches_attempted: usize,

    /// Batches marked completed in this run
    pub batches_completed: usize,

    /// Of those, how many ended as soft successes
    pub soft_successes: usize,

    /// Artifact bytes written in this run
    pub bytes_written: u64,

    /// Batches still pending after the run
    pub pending: usize,

    /// Wall-clock time of the run
    pub duration: Duration,

    /// Why the run stopped
    pub stop_reason: StopReason,
}

impl RunSummary {
    /// Log the summary
    pub fn log_summary(&self) {
        if self.stop_reason.is_clean() {
            tracing::info!(
                total_batches = self.total_batches,
                attempted = self.batches_attempted,
                completed = self.batches_completed,
                soft_successes = self.soft_successes,
                bytes_written = self.bytes_written,
                pending = self.pending,
                duration_secs = self.duration.as_secs(),
                stop_reason = %self.stop_reason,
                "Export run finished"
            );
        } else {
            tracing::error!(
                total_batches = self.total_batches,
                attempted = self.batches_attempted,
                completed = self.batches_completed,
                pending = self.pending,
                duration_secs = self.duration.as_secs(),
                stop_reason = %self.stop_reason,
                "Export run stopped on failure"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HardFailureKind, IdRange};

    #[test]
    fn test_clean_stop_reasons() {
        assert!(StopReason::Drained.is_clean());
        assert!(StopReason::DeadlineReached.is_clean());
        assert!(StopReason::Interrupted.is_clean());
        assert!(!StopReason::Failed(CatalogError::Other("x".to_string())).is_clean());
    }

    #[test]
    fn test_halted_display_carries_range() {
        let reason = StopReason::Halted(HardFailure::new(
            IdRange::new(1_002_000, 1_004_000),
            HardFailureKind::RateLimited {
                body: String::new(),
            },
        ));
        assert!(!reason.is_clean());
        assert!(reason.to_string().contains("[1002000,1004000)"));
    }
}
