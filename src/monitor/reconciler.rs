//! Copy-on-write transforms folding backend-reported terminal states into
//! the shared remote snapshot.
//!
//! Each function returns a NEW `Remote`; the input is never mutated, since
//! the snapshot is shared by reference with sibling views.

use crate::types::{JobKind, OperationPhase, OperationState, Remote};

fn transition(remote: &Remote, kind: JobKind, phase: OperationPhase) -> Remote {
    let jobid = remote.op(kind).jobid;
    remote.with_op(kind, OperationState { phase, jobid })
}

/// Fold a fatal error into the operation's status field
pub fn mark_failed(remote: &Remote, kind: JobKind) -> Remote {
    transition(remote, kind, OperationPhase::Failed)
}

pub fn mark_completed(remote: &Remote, kind: JobKind) -> Remote {
    transition(remote, kind, OperationPhase::Completed)
}

pub fn mark_stopped(remote: &Remote, kind: JobKind) -> Remote {
    transition(remote, kind, OperationPhase::Stopped)
}
