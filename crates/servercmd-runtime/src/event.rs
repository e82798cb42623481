//! Execution events.

use servercmd_models::{ExecutionId, InvocationStatus};

/// Events emitted by the executor.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    /// An execution was admitted and its body launched.
    Started {
        /// Execution ID.
        execution_id: ExecutionId,
        /// Command name.
        command: String,
    },
    /// An execution reached a terminal status after running.
    Finished {
        /// Execution ID.
        execution_id: ExecutionId,
        /// Command name.
        command: String,
        /// Terminal status.
        status: InvocationStatus,
    },
    /// A start request was denied by admission control.
    Rejected {
        /// Execution ID handed to the caller.
        execution_id: ExecutionId,
        /// Command name.
        command: String,
        /// Rejection status.
        status: InvocationStatus,
    },
    /// Cancellation was requested for a live execution.
    CancellationRequested {
        /// Execution ID.
        execution_id: ExecutionId,
    },
    /// A finished execution was evicted from the execution table.
    Evicted {
        /// Execution ID.
        execution_id: ExecutionId,
    },
}

impl ExecutionEvent {
    /// Returns the execution ID associated with this event.
    pub fn execution_id(&self) -> &ExecutionId {
        match self {
            ExecutionEvent::Started { execution_id, .. } => execution_id,
            ExecutionEvent::Finished { execution_id, .. } => execution_id,
            ExecutionEvent::Rejected { execution_id, .. } => execution_id,
            ExecutionEvent::CancellationRequested { execution_id } => execution_id,
            ExecutionEvent::Evicted { execution_id } => execution_id,
        }
    }

    /// Returns true if this event reports a failed execution.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ExecutionEvent::Finished {
                status: InvocationStatus::FailedDuringExecution,
                ..
            }
        )
    }
}
