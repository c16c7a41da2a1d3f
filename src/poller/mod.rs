pub mod aggregator;
pub mod task;

pub use task::ScheduledTask;

use crate::client::types::JobSnapshot;
use crate::client::JobStatusProvider;
use crate::error::MonitorError;
use crate::monitor::{reconciler, RemoteStore};
use crate::presenter::Presenter;
use crate::types::TransferJob;
use aggregator::ProgressAggregator;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::time::{interval, sleep, MissedTickBehavior};

const MAX_BACKOFF_SECS: u64 = 30;

/// Result of one poll tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No job set, operation not active, or no update from the backend
    Skipped,
    /// Display state was refreshed
    Updated,
    /// The job reached a terminal state; polling ends
    Finished(JobOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed,
    Failed(String),
}

/// Everything one poll tick touches, shared between the monitor and the
/// polling task
#[derive(Clone)]
pub struct PollContext {
    pub provider: Arc<dyn JobStatusProvider>,
    pub store: Arc<RemoteStore>,
    pub presenter: Arc<Mutex<Presenter>>,
    pub job: Arc<RwLock<Option<TransferJob>>>,
}

/// Polling configuration; one instance per monitor
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub period: Duration,
    pub max_consecutive_errors: u8,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(crate::DEFAULT_POLL_INTERVAL_MS),
            max_consecutive_errors: 3,
        }
    }
}

/// Drives the poll loop for the currently monitored job.
///
/// Ticks are serialized: the fetch is awaited inside the tick and ticks
/// that fire while a fetch is outstanding are dropped, so a late response
/// can never be applied after a newer one.
pub struct JobPoller {
    ctx: PollContext,
    config: PollConfig,
    task: ScheduledTask,
}

impl JobPoller {
    pub fn new(ctx: PollContext, config: PollConfig) -> Self {
        Self {
            ctx,
            config,
            task: ScheduledTask::new(),
        }
    }

    /// Start the repeating loop. Restarting cancels any previous loop.
    pub fn start(&self) {
        let ctx = self.ctx.clone();
        let config = self.config.clone();

        self.task.start(move |shutdown| async move {
            Self::poll_loop(ctx, config, shutdown).await;
        });
    }

    /// Stop polling. No store or presenter update happens afterwards,
    /// even if a fetch was in flight.
    pub fn stop(&self) {
        self.task.stop();
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// One complete deterministic tick: fetch, validate, reconcile,
    /// aggregate, present
    pub async fn poll_once(&self) -> Result<TickOutcome, MonitorError> {
        poll_tick(&self.ctx).await
    }

    async fn poll_loop(ctx: PollContext, config: PollConfig, shutdown: Arc<Notify>) {
        let mut ticker = interval(config.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut consecutive_errors: u8 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match poll_tick(&ctx).await {
                        Ok(TickOutcome::Finished(outcome)) => {
                            info!("Polling finished: {outcome:?}");
                            break;
                        }
                        Ok(_) => {
                            consecutive_errors = 0;
                        }
                        Err(e) => {
                            consecutive_errors += 1;
                            warn!(
                                "Poll failed ({consecutive_errors}/{}): {e}",
                                config.max_consecutive_errors
                            );

                            if consecutive_errors >= config.max_consecutive_errors {
                                error!("Too many consecutive poll failures, giving up");
                                abandon(&ctx).await;
                                break;
                            }

                            let backoff = Duration::from_secs(backoff_secs(consecutive_errors));
                            tokio::select! {
                                _ = sleep(backoff) => {}
                                _ = shutdown.notified() => break,
                            }
                        }
                    }
                }
                _ = shutdown.notified() => {
                    debug!("Poll loop shutdown requested");
                    break;
                }
            }
        }
    }
}

/// Exponential backoff after `consecutive_errors` failed ticks: 1s, 2s,
/// 4s... capped. The exponent is clamped so the shift cannot overflow
/// for large configured error limits.
fn backoff_secs(consecutive_errors: u8) -> u64 {
    (1u64 << (consecutive_errors - 1).min(5)).min(MAX_BACKOFF_SECS)
}

/// Shared tick body used by both the loop and [`JobPoller::poll_once`]
async fn poll_tick(ctx: &PollContext) -> Result<TickOutcome, MonitorError> {
    let job = match ctx.job.read().await.clone() {
        Some(job) => job,
        None => return Ok(TickOutcome::Skipped),
    };

    // The shared snapshot is the "is this job still active" predicate
    if ctx.store.snapshot().op(job.kind).phase != crate::types::OperationPhase::Active {
        return Ok(TickOutcome::Skipped);
    }

    let snapshot = match ctx.provider.job_status(job.jobid).await? {
        Some(snapshot) => snapshot,
        None => {
            debug!("Job {}: no update this tick", job.jobid);
            return Ok(TickOutcome::Skipped);
        }
    };

    apply_snapshot(ctx, &job, snapshot).await
}

async fn apply_snapshot(
    ctx: &PollContext,
    job: &TransferJob,
    snapshot: JobSnapshot,
) -> Result<TickOutcome, MonitorError> {
    if let Some(stats) = &snapshot.stats {
        if stats.fatal_error {
            let reason = if stats.last_error.is_empty() {
                "fatal error reported by backend".to_string()
            } else {
                stats.last_error.clone()
            };
            error!("Job {} ({}): {reason}", job.jobid, job.kind);

            ctx.store.update(|r| reconciler::mark_failed(r, job.kind));
            ctx.job.write().await.take();
            return Ok(TickOutcome::Finished(JobOutcome::Failed(reason)));
        }

        let (aggregate, files) = ProgressAggregator::aggregate(stats);
        ctx.presenter.lock().await.publish(&aggregate, files);
    } else {
        // Malformed or missing stats: skip aggregation, keep the
        // previous display
        debug!("Job {}: snapshot without stats", job.jobid);
    }

    if snapshot.finished {
        ctx.job.write().await.take();

        return if snapshot.success {
            info!("Job {} ({}) completed", job.jobid, job.kind);
            ctx.store
                .update(|r| reconciler::mark_completed(r, job.kind));
            Ok(TickOutcome::Finished(JobOutcome::Completed))
        } else {
            warn!("Job {} ({}) failed: {}", job.jobid, job.kind, snapshot.error);
            ctx.store.update(|r| reconciler::mark_failed(r, job.kind));
            Ok(TickOutcome::Finished(JobOutcome::Failed(snapshot.error)))
        };
    }

    Ok(TickOutcome::Updated)
}

/// Persistent-failure exit: surface the failure instead of silently going
/// stale forever
async fn abandon(ctx: &PollContext) {
    if let Some(job) = ctx.job.write().await.take() {
        ctx.store.update(|r| reconciler::mark_failed(r, job.kind));
    }
}
