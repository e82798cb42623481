//! Invocation status and command availability codes.
//!
//! Both enums travel over the wire as their integer codes. The numbering is
//! shared: the rejection statuses 5..=8 line up with the availability
//! reasons of the same value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An integer that does not map to any known code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown code: {0}")]
pub struct UnknownCodeError(pub u8);

/// Lifecycle status of a single execution.
///
/// The ordering is meaningful: every status greater than
/// [`InvocationStatus::InProgress`] is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum InvocationStatus {
    /// Execution is scheduled.
    #[default]
    Queued = 0,
    /// Execution is in progress (details in the status message).
    InProgress = 1,
    /// Execution has been completed successfully.
    Completed = 2,
    /// Execution was canceled.
    Canceled = 3,
    /// Failed (details in the status message).
    FailedDuringExecution = 4,
    /// Rejected because concurrent invocations are still running.
    RejectedConcurrencyLock = 5,
    /// Rejected because the command was executed too often.
    RejectedTresholdLock = 6,
    /// Rejected because the caller lacks the required rights.
    RejectedNoPermission = 7,
    /// Rejected because the command is unknown or permanently disabled.
    RejectedPermanentlyUnavailable = 8,
}

impl InvocationStatus {
    /// Returns the wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns true once the execution can no longer change.
    pub fn is_done(self) -> bool {
        self > InvocationStatus::InProgress
    }

    /// Returns true for the four admission rejections.
    pub fn is_rejected(self) -> bool {
        self >= InvocationStatus::RejectedConcurrencyLock
    }
}

impl From<InvocationStatus> for u8 {
    fn from(status: InvocationStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for InvocationStatus {
    type Error = UnknownCodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(InvocationStatus::Queued),
            1 => Ok(InvocationStatus::InProgress),
            2 => Ok(InvocationStatus::Completed),
            3 => Ok(InvocationStatus::Canceled),
            4 => Ok(InvocationStatus::FailedDuringExecution),
            5 => Ok(InvocationStatus::RejectedConcurrencyLock),
            6 => Ok(InvocationStatus::RejectedTresholdLock),
            7 => Ok(InvocationStatus::RejectedNoPermission),
            8 => Ok(InvocationStatus::RejectedPermanentlyUnavailable),
            other => Err(UnknownCodeError(other)),
        }
    }
}

/// Verdict of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum CommandAvailability {
    /// A new execution can be started right now.
    ExecutionPossible = 0,
    /// Concurrent invocations are running; retry once they finish.
    ConcurrencyLock = 5,
    /// The command was executed too often; retry later.
    TresholdLock = 6,
    /// The caller lacks the required rights.
    NoPermission = 7,
    /// The command is not implemented or permanently disabled.
    PermanentlyUnavailable = 8,
}

impl CommandAvailability {
    /// Returns the wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns true if an execution may start.
    pub fn is_possible(self) -> bool {
        self == CommandAvailability::ExecutionPossible
    }

    /// Maps a denial to the terminal status a rejected execution reports.
    ///
    /// Returns `None` for [`CommandAvailability::ExecutionPossible`].
    pub fn rejection_status(self) -> Option<InvocationStatus> {
        match self {
            CommandAvailability::ExecutionPossible => None,
            CommandAvailability::ConcurrencyLock => Some(InvocationStatus::RejectedConcurrencyLock),
            CommandAvailability::TresholdLock => Some(InvocationStatus::RejectedTresholdLock),
            CommandAvailability::NoPermission => Some(InvocationStatus::RejectedNoPermission),
            CommandAvailability::PermanentlyUnavailable => {
                Some(InvocationStatus::RejectedPermanentlyUnavailable)
            }
        }
    }

    /// Returns the variant name, e.g. `"ConcurrencyLock"`.
    pub fn name(self) -> &'static str {
        match self {
            CommandAvailability::ExecutionPossible => "ExecutionPossible",
            CommandAvailability::ConcurrencyLock => "ConcurrencyLock",
            CommandAvailability::TresholdLock => "TresholdLock",
            CommandAvailability::NoPermission => "NoPermission",
            CommandAvailability::PermanentlyUnavailable => "PermanentlyUnavailable",
        }
    }
}

impl From<CommandAvailability> for u8 {
    fn from(availability: CommandAvailability) -> Self {
        availability.code()
    }
}

impl TryFrom<u8> for CommandAvailability {
    type Error = UnknownCodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CommandAvailability::ExecutionPossible),
            5 => Ok(CommandAvailability::ConcurrencyLock),
            6 => Ok(CommandAvailability::TresholdLock),
            7 => Ok(CommandAvailability::NoPermission),
            8 => Ok(CommandAvailability::PermanentlyUnavailable),
            other => Err(UnknownCodeError(other)),
        }
    }
}
