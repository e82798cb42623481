//! Execution state records.

use serde::{Deserialize, Serialize};

use crate::ids::ExecutionId;
use crate::status::InvocationStatus;

/// Observable status of one command execution.
///
/// This is the record callers poll. It is always handed out as a snapshot;
/// re-poll to observe later progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    /// Unique id of the execution.
    pub execution_id: ExecutionId,

    /// Name of the executed command.
    pub command_name: String,

    /// Current lifecycle status.
    pub invocation_state: InvocationStatus,

    /// Progress text while running, error detail after a failure.
    pub status_message: Option<String>,

    /// Progress counter. Can also carry the running number of the record
    /// being processed, or a percentage when `total_steps == 100`. After a
    /// failure it may stay below `total_steps` to mark where it happened.
    pub current_step: u32,

    /// Target value of `current_step` on completion.
    pub total_steps: u32,

    /// Whether the execution can be canceled right now.
    pub cancellation_possible: bool,

    /// Whether cancellation was requested. May be set even while
    /// cancellation is not possible yet.
    pub cancellation_requested: bool,
}

impl ExecutionState {
    /// Creates a queued record for a fresh execution.
    pub fn queued(command_name: impl Into<String>) -> Self {
        Self::with_id(ExecutionId::new(), command_name)
    }

    /// Creates a queued record with an explicit id.
    pub fn with_id(execution_id: ExecutionId, command_name: impl Into<String>) -> Self {
        Self {
            execution_id,
            command_name: command_name.into(),
            invocation_state: InvocationStatus::Queued,
            status_message: None,
            current_step: 0,
            total_steps: 0,
            cancellation_possible: false,
            cancellation_requested: false,
        }
    }

    /// Returns true once the execution reached a terminal status.
    pub fn is_done(&self) -> bool {
        self.invocation_state.is_done()
    }
}
