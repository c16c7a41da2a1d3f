use crate::types::Remote;
use std::sync::Arc;
use tokio::sync::watch;

/// Single authoritative store for the shared selected-remote snapshot.
///
/// Consumers always hold an `Arc<Remote>` snapshot, never a mutable
/// reference; every update builds a new `Remote` and publishes it, so
/// sibling views observe changes through their own subscription.
pub struct RemoteStore {
    tx: watch::Sender<Arc<Remote>>,
}

impl RemoteStore {
    pub fn new(initial: Remote) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Remote> {
        self.tx.borrow().clone()
    }

    /// Subscribe to every publication
    pub fn subscribe(&self) -> watch::Receiver<Arc<Remote>> {
        self.tx.subscribe()
    }

    /// Copy-on-write update: `f` receives the current snapshot and
    /// returns its replacement
    pub fn update(&self, f: impl FnOnce(&Remote) -> Remote) -> Arc<Remote> {
        let next = Arc::new(f(&self.snapshot()));
        self.tx.send_replace(next.clone());
        next
    }

    /// Replace the snapshot wholesale, e.g. when the user selects a
    /// different remote
    pub fn replace(&self, remote: Remote) -> Arc<Remote> {
        let next = Arc::new(remote);
        self.tx.send_replace(next.clone());
        next
    }
}
