//! Time-boxed sequential batch loop

use super::fetcher::{BatchFetcher, FetchOutcome};
use super::summary::{RunSummary, StopReason};
use crate::adapters::catalog::LastIdSource;
use crate::core::checkpoint::{Checkpoint, CheckpointManager};
use crate::core::planner::ArtifactNaming;
use crate::domain::{CatalogError, Result};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Decides when a run has used up its time budget
pub trait Deadline: Send + Sync {
    fn expired(&self) -> bool;
}

/// Deadline measured from when it was created
#[derive(Debug, Clone, Copy)]
pub struct WallClockDeadline {
    started: Instant,
    budget: Duration,
}

impl WallClockDeadline {
    /// Deadline `budget` from now
    pub fn starting_now(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }
}

impl Deadline for WallClockDeadline {
    fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }
}

/// How the ID space is split into batches on first run
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub range_start: u64,
    pub chunk_size: u64,
    pub naming: ArtifactNaming,
}

/// Drives batches from the checkpoint through the fetcher, one at a time
pub struct BatchScheduler {
    manager: CheckpointManager,
    last_id: Box<dyn LastIdSource>,
    fetcher: Box<dyn BatchFetcher>,
    plan: PlanSettings,
    shutdown: watch::Receiver<bool>,
}

impl BatchScheduler {
    pub fn new(
        manager: CheckpointManager,
        last_id: Box<dyn LastIdSource>,
        fetcher: Box<dyn BatchFetcher>,
        plan: PlanSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            manager,
            last_id,
            fetcher,
            plan,
            shutdown,
        }
    }

    /// Load state, plan if needed, then process batches for up to `budget`
    ///
    /// The budget clock starts once planning is done, so time spent loading
    /// the checkpoint or looking up the last known ID is not charged to it.
    /// Stop conditions are checked between batches only; a fetch in progress
    /// always runs to completion.
    ///
    /// # Errors
    ///
    /// Errors while loading the checkpoint, resolving the last known ID or
    /// planning are returned as `Err`. Failures inside the loop end the run
    /// with [`StopReason::Halted`] or [`StopReason::Failed`] in the summary.
    pub async fn run(&self, budget: Duration) -> Result<RunSummary> {
        self.run_with(|| WallClockDeadline::starting_now(budget)).await
    }

    /// Like [`run`](Self::run), with the deadline built by `start_deadline`
    /// right before the first batch
    pub async fn run_with<D, F>(&self, start_deadline: F) -> Result<RunSummary>
    where
        D: Deadline,
        F: FnOnce() -> D + Send,
    {
        let started = Instant::now();

        let mut checkpoint = self.manager.load().await?;
        self.manager
            .resolve_last_known_id(&mut checkpoint, self.last_id.as_ref())
            .await?;
        self.manager
            .ensure_batches(
                &mut checkpoint,
                self.plan.range_start,
                self.plan.chunk_size,
                &self.plan.naming,
            )
            .await?;

        tracing::info!(
            total_batches = checkpoint.batches.len(),
            pending = checkpoint.pending_count(),
            "Starting export loop"
        );

        let mut summary = RunSummary {
            total_batches: checkpoint.batches.len(),
            batches_attempted: 0,
            batches_completed: 0,
            soft_successes: 0,
            bytes_written: 0,
            pending: checkpoint.pending_count(),
            duration: Duration::ZERO,
            stop_reason: StopReason::Drained,
        };

        let deadline = start_deadline();
        let stop_reason = self
            .process_batches(&mut checkpoint, &deadline, &mut summary)
            .await;
        summary.stop_reason = stop_reason;
        summary.pending = checkpoint.pending_count();
        summary.duration = started.elapsed();
        summary.log_summary();

        Ok(summary)
    }

    async fn process_batches(
        &self,
        checkpoint: &mut Checkpoint,
        deadline: &dyn Deadline,
        summary: &mut RunSummary,
    ) -> StopReason {
        loop {
            if *self.shutdown.borrow() {
                tracing::info!("Shutdown requested, stopping before next batch");
                return StopReason::Interrupted;
            }

            if deadline.expired() {
                tracing::info!("Run time budget reached, stopping before next batch");
                return StopReason::DeadlineReached;
            }

            let Some(batch) = self.manager.next_eligible_batch(checkpoint) else {
                tracing::info!("No pending batches left");
                return StopReason::Drained;
            };

            summary.batches_attempted += 1;
            let ordinal = summary.batches_attempted;
            tracing::info!(
                ordinal,
                range = %batch.range(),
                artifact = %batch.artifact_name,
                "Processing batch"
            );

            let outcome = match self.fetcher.fetch(&batch).await {
                Ok(outcome) => outcome,
                Err(CatalogError::Fetch(failure)) if failure.is_rate_limited() => {
                    tracing::warn!(
                        range = %failure.range,
                        "Remote rate limit hit, halting until the next invocation"
                    );
                    return StopReason::Halted(failure);
                }
                Err(e) => {
                    crate::log_error_with_context!(&e, "Batch fetch failed");
                    return StopReason::Failed(e);
                }
            };

            if let Err(e) = self.manager.mark_completed(checkpoint, &batch).await {
                crate::log_error_with_context!(&e, "Failed to record completed batch");
                return StopReason::Failed(e);
            }

            summary.batches_completed += 1;
            summary.bytes_written += outcome.artifact().bytes;
            if matches!(outcome, FetchOutcome::SoftSuccess { .. }) {
                summary.soft_successes += 1;
            }
            crate::log_batch_complete!(ordinal, &batch.range(), outcome.label());
        }
    }
}
