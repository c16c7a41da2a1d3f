use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct RunningTask {
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

/// A single cancellable repeating task.
///
/// `start` is idempotently restartable: starting while a previous run is
/// alive cancels it first, so two timers never poll the same job. `stop`
/// is immediate and total: the spawned future is aborted at its next
/// suspension point and no further continuations run.
pub struct ScheduledTask {
    inner: Mutex<Option<RunningTask>>,
}

impl ScheduledTask {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Spawn `run`, handing it a shutdown handle to select against
    pub fn start<F, Fut>(&self, run: F)
    where
        F: FnOnce(Arc<Notify>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(run(shutdown.clone()));

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *inner = Some(RunningTask { shutdown, handle });
    }

    /// Cancel the running task, if any. Safe to call repeatedly.
    pub fn stop(&self) {
        let task = self.inner.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            task.shutdown.notify_one();
            task.handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|t| !t.handle.is_finished())
            .unwrap_or(false)
    }
}

impl Default for ScheduledTask {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.stop();
    }
}
