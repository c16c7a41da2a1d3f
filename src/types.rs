use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of transfer operation running against a remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Sync,
    Copy,
    Move,
    Check,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobKind::Sync => "sync",
            JobKind::Copy => "copy",
            JobKind::Move => "move",
            JobKind::Check => "check",
        };
        f.write_str(s)
    }
}

/// Lifecycle of one monitored operation.
///
/// Polling happens only in `Active`. `Active -> Failed` is driven by the
/// reconciler; `Starting`, `Active` and `Stopped` are driven by the
/// externally issued start/stop commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationPhase {
    Idle,
    Starting,
    Active,
    Completed,
    Failed,
    Stopped,
}

impl OperationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OperationPhase::Completed | OperationPhase::Failed | OperationPhase::Stopped
        )
    }
}

/// Per-operation state nested inside a [`Remote`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    pub phase: OperationPhase,
    pub jobid: Option<u64>,
}

impl Default for OperationState {
    fn default() -> Self {
        Self {
            phase: OperationPhase::Idle,
            jobid: None,
        }
    }
}

/// The selected storage endpoint being observed.
///
/// Shared by reference across sibling views; this crate never mutates a
/// `Remote` in place. All updates go through the store as copy-on-write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub mount: OperationState,
    pub sync: OperationState,
    pub copy: OperationState,
}

impl Remote {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount: OperationState::default(),
            sync: OperationState::default(),
            copy: OperationState::default(),
        }
    }

    /// Operation state observed for a job kind. Move and check jobs share
    /// the copy panel, as in the management console.
    pub fn op(&self, kind: JobKind) -> &OperationState {
        match kind {
            JobKind::Sync => &self.sync,
            JobKind::Copy | JobKind::Move | JobKind::Check => &self.copy,
        }
    }

    /// Copy-on-write replacement of one operation state
    pub fn with_op(&self, kind: JobKind, state: OperationState) -> Remote {
        let mut next = self.clone();
        match kind {
            JobKind::Sync => next.sync = state,
            JobKind::Copy | JobKind::Move | JobKind::Check => next.copy = state,
        }
        next
    }
}

/// One active operation against a remote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferJob {
    pub jobid: u64,
    pub kind: JobKind,
    pub remote_name: String,
    pub source: String,
    pub destination: String,
    pub start_time: DateTime<Utc>,
}

impl TransferJob {
    pub fn new(
        jobid: u64,
        kind: JobKind,
        remote_name: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            jobid,
            kind,
            remote_name: remote_name.into(),
            source: source.into(),
            destination: destination.into(),
            start_time: Utc::now(),
        }
    }
}

/// One in-flight file within a job, replaced wholesale each poll tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFile {
    pub name: String,
    pub bytes: u64,
    pub size: u64,
    pub speed: f64,
    pub eta: Option<f64>,
    pub src_fs: Option<String>,
    pub dst_fs: Option<String>,
    /// `min(100, round(bytes / size * 100))`, 0 when size is unknown
    pub percentage: u8,
    /// Reported positionally complete while the byte count disagrees.
    /// A heuristic; the backend does not confirm completion per file.
    pub is_error: bool,
}

/// Whole-job figures derived fresh from each snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub bytes: u64,
    pub total_bytes: u64,
    pub speed: f64,
    pub eta: Option<f64>,
    pub percentage: u8,
    pub active_files: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_op_leaves_original_untouched() {
        let remote = Remote::new("gdrive");
        let updated = remote.with_op(
            JobKind::Sync,
            OperationState {
                phase: OperationPhase::Active,
                jobid: Some(7),
            },
        );

        assert_eq!(remote.sync.phase, OperationPhase::Idle);
        assert_eq!(updated.sync.phase, OperationPhase::Active);
        assert_eq!(updated.sync.jobid, Some(7));
        assert_eq!(updated.copy, remote.copy);
        assert_eq!(updated.mount, remote.mount);
    }

    #[test]
    fn test_move_and_check_share_copy_state() {
        let remote = Remote::new("s3").with_op(
            JobKind::Move,
            OperationState {
                phase: OperationPhase::Active,
                jobid: Some(3),
            },
        );

        assert_eq!(remote.op(JobKind::Check).jobid, Some(3));
        assert_eq!(remote.sync, OperationState::default());
    }

    #[test]
    fn test_terminal_phases() {
        assert!(OperationPhase::Completed.is_terminal());
        assert!(OperationPhase::Failed.is_terminal());
        assert!(OperationPhase::Stopped.is_terminal());
        assert!(!OperationPhase::Active.is_terminal());
        assert!(!OperationPhase::Starting.is_terminal());
        assert!(!OperationPhase::Idle.is_terminal());
    }
}
