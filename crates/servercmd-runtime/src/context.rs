//! Per-invocation execution context.
//!
//! An [`ExecutionContext`] owns the state record of one execution and drives
//! it from `Queued` to a terminal status. The same type is the capability
//! handed to the command body: the public methods are what a body may use,
//! the crate-private ones belong to the executor.
//!
//! # State consistency
//!
//! The record lives in a `tokio::sync::watch` channel. Every write replaces
//! the whole record under the channel's lock and every read clones it, so a
//! poller never sees progress counters from one update paired with the
//! status of another. The channel also wakes callers waiting for the
//! terminal status.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use servercmd_models::{ExecutionId, ExecutionState, InvocationStatus};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::RegisteredCommand;
use crate::event::ExecutionEvent;
use crate::executor::{CommandExecutor, ExecutorShared};

/// The live run of one command invocation.
pub struct ExecutionContext {
    execution_id: ExecutionId,
    command: Arc<RegisteredCommand>,
    arguments: Vec<String>,
    state: watch::Sender<ExecutionState>,
    cancellation: CancellationToken,
    last_access: Mutex<Instant>,
    task: Mutex<Option<JoinHandle<()>>>,
    started_at: DateTime<Utc>,
    executor: Weak<ExecutorShared>,
    events: broadcast::Sender<ExecutionEvent>,
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.execution_id)
            .field("command", &self.command.name())
            .field("arguments", &self.arguments)
            .field("status", &self.status())
            .field("started_at", &self.started_at)
            .finish()
    }
}

impl ExecutionContext {
    pub(crate) fn new(
        command: Arc<RegisteredCommand>,
        arguments: Vec<String>,
        state: ExecutionState,
        executor: Weak<ExecutorShared>,
        events: broadcast::Sender<ExecutionEvent>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(state);
        let execution_id = state.borrow().execution_id.clone();

        Arc::new(Self {
            execution_id,
            command,
            arguments,
            state,
            cancellation: CancellationToken::new(),
            last_access: Mutex::new(Instant::now()),
            task: Mutex::new(None),
            started_at: Utc::now(),
            executor,
            events,
        })
    }

    /// Returns the executor that owns this execution, unless it was dropped.
    pub fn executor(&self) -> Option<CommandExecutor> {
        self.executor.upgrade().map(CommandExecutor::from_shared)
    }

    /// Returns the execution id.
    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    /// Returns the name of the executed command.
    pub fn command_name(&self) -> &str {
        self.command.name()
    }

    /// Returns the arguments the execution was started with.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Returns the argument at `index`, if supplied.
    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    /// Returns the cancellation token observed by the body.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancellation_requested(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Declares whether the body currently honors cancellation requests.
    ///
    /// Bodies that never check the token must leave this `false`.
    pub fn set_cancellation_possible(&self, possible: bool) {
        self.state.send_if_modified(|s| {
            std::mem::replace(&mut s.cancellation_possible, possible) != possible
        });
    }

    /// Returns whether the body declared cancellation possible.
    pub fn cancellation_possible(&self) -> bool {
        self.state.borrow().cancellation_possible
    }

    /// Publishes progress. `None` clears the status message.
    pub fn report_progress(
        &self,
        current_step: u32,
        total_steps: u32,
        status_message: Option<&str>,
    ) {
        self.touch();
        self.state.send_modify(|s| {
            s.current_step = current_step;
            s.total_steps = total_steps;
            s.status_message = status_message.map(str::to_string);
        });
    }

    /// Returns a snapshot of the state record.
    pub fn state(&self) -> ExecutionState {
        self.state.borrow().clone()
    }

    /// Returns the current status.
    pub fn status(&self) -> InvocationStatus {
        self.state.borrow().invocation_state
    }

    /// Returns when the context was created.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Launches the body on the blocking pool. A second call is a no-op.
    pub(crate) fn start(self: &Arc<Self>) {
        self.touch();

        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            return;
        }

        info!(
            execution_id = %self.execution_id,
            command = %self.command.name(),
            arguments = self.arguments.len(),
            "execution started"
        );
        // Sent before spawning so it always precedes `Finished`.
        let _ = self.events.send(ExecutionEvent::Started {
            execution_id: self.execution_id.clone(),
            command: self.command.name().to_string(),
        });

        let context = Arc::clone(self);
        *task = Some(tokio::task::spawn_blocking(move || context.run()));
    }

    /// Raises the cancellation flag and signals the token.
    ///
    /// Returns false without touching the record if the execution already
    /// finished. Never changes the status itself.
    pub(crate) fn request_cancellation(&self) -> bool {
        self.touch();

        let applied = self.state.send_if_modified(|s| {
            if s.invocation_state.is_done() {
                return false;
            }
            s.cancellation_requested = true;
            true
        });
        if applied {
            self.cancellation.cancel();
        }
        applied
    }

    /// Refreshes the last-access timestamp used for eviction.
    pub(crate) fn touch(&self) {
        *self
            .last_access
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// True once the execution is terminal and untouched for longer than
    /// `retention`.
    pub(crate) fn is_orphaned(&self, retention: Duration, now: Instant) -> bool {
        if !self.status().is_done() {
            return false;
        }
        let last_access = *self
            .last_access
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last_access) > retention
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ExecutionState> {
        self.state.subscribe()
    }

    /// Moves the status forward. Transitions that would go backwards or
    /// leave a terminal status are ignored.
    pub(crate) fn transition(&self, next: InvocationStatus) -> bool {
        self.state.send_if_modified(|s| {
            if s.invocation_state.is_done() || next <= s.invocation_state {
                return false;
            }
            s.invocation_state = next;
            true
        })
    }

    fn run(&self) {
        self.transition(InvocationStatus::InProgress);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.command.invoke(self)));
        let status = match outcome {
            Ok(Ok(result)) => {
                self.transition(result.status());
                self.status()
            }
            Ok(Err(err)) => self.fail(err.to_string()),
            Err(payload) => self.fail(panic_message(payload.as_ref())),
        };

        self.touch();

        if status == InvocationStatus::FailedDuringExecution {
            warn!(
                execution_id = %self.execution_id,
                command = %self.command.name(),
                message = ?self.state.borrow().status_message,
                "execution failed"
            );
        } else {
            info!(
                execution_id = %self.execution_id,
                command = %self.command.name(),
                status = ?status,
                "execution finished"
            );
        }

        let _ = self.events.send(ExecutionEvent::Finished {
            execution_id: self.execution_id.clone(),
            command: self.command.name().to_string(),
            status,
        });
    }

    fn fail(&self, message: String) -> InvocationStatus {
        debug!(execution_id = %self.execution_id, error = %message, "command body raised an error");
        self.state.send_modify(|s| {
            if !s.invocation_state.is_done() {
                s.invocation_state = InvocationStatus::FailedDuringExecution;
            }
            s.cancellation_possible = false;
            s.status_message = Some(message);
        });
        self.status()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "command body panicked".to_string()
    }
}
