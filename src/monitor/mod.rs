pub mod reconciler;
pub mod store;

pub use store::RemoteStore;

use crate::client::JobStatusProvider;
use crate::error::MonitorError;
use crate::poller::{JobPoller, PollConfig, PollContext, TickOutcome};
use crate::presenter::{Presenter, RenderSurface};
use crate::types::{AggregateStats, JobKind, OperationPhase, OperationState, TransferJob};
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Tuning knobs for one monitor instance
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_period: Duration,
    pub history_capacity: usize,
    pub max_consecutive_errors: u8,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_period: Duration::from_millis(crate::DEFAULT_POLL_INTERVAL_MS),
            history_capacity: crate::presenter::DEFAULT_HISTORY_CAPACITY,
            max_consecutive_errors: 3,
        }
    }
}

/// One parameterized monitoring pipeline replacing the per-view variants:
/// poller, aggregator, history, presenter and reconciler behind a single
/// surface, configured by job kind at start time.
///
/// Start/stop of the underlying backend operation is external; the
/// monitor reacts to [`TransferMonitor::job_started`] and
/// [`TransferMonitor::stop`] triggers and otherwise only observes.
pub struct TransferMonitor {
    store: Arc<RemoteStore>,
    presenter: Arc<Mutex<Presenter>>,
    job: Arc<RwLock<Option<TransferJob>>>,
    poller: JobPoller,
}

impl TransferMonitor {
    pub fn new(
        provider: Arc<dyn JobStatusProvider>,
        store: Arc<RemoteStore>,
        config: MonitorConfig,
    ) -> Self {
        let presenter = Arc::new(Mutex::new(Presenter::new(config.history_capacity)));
        let job = Arc::new(RwLock::new(None));

        let ctx = PollContext {
            provider,
            store: store.clone(),
            presenter: presenter.clone(),
            job: job.clone(),
        };
        let poller = JobPoller::new(
            ctx,
            PollConfig {
                period: config.poll_period,
                max_consecutive_errors: config.max_consecutive_errors,
            },
        );

        Self {
            store,
            presenter,
            job,
            poller,
        }
    }

    pub fn store(&self) -> &Arc<RemoteStore> {
        &self.store
    }

    /// Handle to the presenter, for the host view to configure sorting,
    /// filtering and read the latest series
    pub fn presenter(&self) -> Arc<Mutex<Presenter>> {
        self.presenter.clone()
    }

    pub async fn attach_surface(&self, surface: Box<dyn RenderSurface>) {
        self.presenter.lock().await.attach(surface);
    }

    pub async fn detach_surface(&self) {
        self.presenter.lock().await.teardown();
    }

    /// Switch the observed remote. Stops polling and discards the job,
    /// history buffers and table so the new selection starts clean.
    pub async fn select_remote(&self, remote: crate::types::Remote) {
        self.poller.stop();
        self.job.write().await.take();
        self.presenter.lock().await.reset();
        info!("Selected remote '{}'", remote.name);
        self.store.replace(remote);
    }

    /// External start command was issued; reflect it before the backend
    /// hands back a job id
    pub async fn operation_starting(&self, kind: JobKind) {
        self.store.update(|r| {
            r.with_op(
                kind,
                OperationState {
                    phase: OperationPhase::Starting,
                    jobid: None,
                },
            )
        });
    }

    /// The backend accepted the operation; record it as Active. Call
    /// [`TransferMonitor::start_polling`] to begin the repeating loop, or
    /// drive ticks directly with [`TransferMonitor::poll_once`].
    pub async fn job_started(&self, job: TransferJob) {
        info!(
            "Job {} ({}) started on '{}': {} -> {}",
            job.jobid, job.kind, job.remote_name, job.source, job.destination
        );

        self.store.update(|r| {
            r.with_op(
                job.kind,
                OperationState {
                    phase: OperationPhase::Active,
                    jobid: Some(job.jobid),
                },
            )
        });
        *self.job.write().await = Some(job);
    }

    /// Start the repeating poll loop for the current job. Restarting
    /// cancels any previous loop first.
    pub fn start_polling(&self) {
        self.poller.start();
    }

    /// External stop command was issued. The file rows and history
    /// buffers are discarded along with the job; a stopped operation
    /// must not keep displaying its in-flight files.
    pub async fn stop(&self) {
        self.poller.stop();
        if let Some(job) = self.job.write().await.take() {
            info!("Job {} ({}) stopped", job.jobid, job.kind);
            self.store
                .update(|r| reconciler::mark_stopped(r, job.kind));
            self.presenter.lock().await.reset();
        }
    }

    /// Run one poll tick synchronously; used by hosts that drive their
    /// own cadence and by tests
    pub async fn poll_once(&self) -> Result<TickOutcome, MonitorError> {
        self.poller.poll_once().await
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub async fn current_job(&self) -> Option<TransferJob> {
        self.job.read().await.clone()
    }

    pub async fn latest_stats(&self) -> Option<AggregateStats> {
        self.presenter.lock().await.latest().cloned()
    }

    /// Tear everything down: polling halts and the rendering surface is
    /// released
    pub async fn shutdown(&self) {
        self.poller.stop();
        self.presenter.lock().await.teardown();
    }
}
