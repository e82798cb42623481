//! Admission control.
//!
//! Decides whether a new execution of a command may start, in two phases.
//! The command's own predicate runs first, with no engine lock held, and may
//! freely query the executor. The built-in concurrency limit is checked
//! afterwards against an [`AdmissionView`] of the locked execution table, in
//! the same critical section that inserts the new context, so concurrent
//! start requests cannot jointly exceed it.

use std::collections::HashMap;
use std::sync::Arc;

use servercmd_models::{CommandAvailability, ExecutionId};

use crate::command::RegisteredCommand;
use crate::context::ExecutionContext;
use crate::executor::CommandExecutor;

/// Read-only view of the live executions, valid while the table is locked.
pub(crate) struct AdmissionView<'a> {
    contexts: &'a HashMap<ExecutionId, Arc<ExecutionContext>>,
}

impl<'a> AdmissionView<'a> {
    pub(crate) fn new(contexts: &'a HashMap<ExecutionId, Arc<ExecutionContext>>) -> Self {
        Self { contexts }
    }

    /// Number of executions that are queued or in progress.
    pub(crate) fn concurrent_executions(&self) -> usize {
        self.contexts
            .values()
            .filter(|c| !c.status().is_done())
            .count()
    }

    /// Number of executions of `command` that are queued or in progress.
    pub(crate) fn concurrent_executions_of(&self, command: &str) -> usize {
        self.contexts
            .values()
            .filter(|c| c.command_name() == command && !c.status().is_done())
            .count()
    }
}

/// Runs the command's predicate; `None` means it is not registered.
///
/// Must be called without the execution table locked.
pub(crate) fn evaluate_predicate(
    command: Option<&RegisteredCommand>,
    executor: &CommandExecutor,
) -> CommandAvailability {
    let Some(command) = command else {
        return CommandAvailability::PermanentlyUnavailable;
    };

    match command.availability() {
        None => CommandAvailability::ExecutionPossible,
        Some(predicate) => predicate(executor, command.name()),
    }
}

/// Checks the command's concurrency limit against the locked table.
pub(crate) fn check_limit(
    command: &RegisteredCommand,
    view: &AdmissionView<'_>,
) -> CommandAvailability {
    match command.concurrency_limit() {
        Some(limit) if view.concurrent_executions_of(command.name()) >= limit => {
            CommandAvailability::ConcurrencyLock
        }
        _ => CommandAvailability::ExecutionPossible,
    }
}
