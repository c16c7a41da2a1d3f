//! # Transfer Monitor
//!
//! Live monitoring core for a remote-storage synchronization backend.
//!
//! ## Features
//!
//! - HTTP JSON client for the backend's rc-style job-status API
//! - Progress polling every 1 second, serialized ticks, bounded retry
//! - Per-file and whole-job transfer aggregation
//! - Fixed-capacity rolling history buffers for speed/progress charts
//! - Copy-on-write shared remote state with a subscription surface
//! - Presenter adapter pushing rows and series to a host rendering surface

pub mod client;
pub mod error;
pub mod monitor;
pub mod poller;
pub mod presenter;
pub mod types;

pub use client::{JobStatusProvider, RcClient};
pub use error::MonitorError;
pub use monitor::{MonitorConfig, RemoteStore, TransferMonitor};
pub use poller::{JobOutcome, JobPoller, ScheduledTask, TickOutcome};
pub use presenter::{HistoryBuffer, Presenter, RenderSurface, SortKey, TransferTable};
pub use types::{
    AggregateStats, JobKind, OperationPhase, OperationState, Remote, TransferFile, TransferJob,
};

/// Default rc API endpoint of the sync backend
pub const DEFAULT_RC_URL: &str = "http://127.0.0.1:5572";

/// Default polling period in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
