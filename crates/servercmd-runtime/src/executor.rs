//! The command executor facade.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use servercmd_models::{
    CommandAvailability, CommandDescription, ExecutionId, ExecutionState, InvocationStatus,
};
use tokio::sync::broadcast;
use tracing::debug;

use crate::admission;
use crate::command::{CommandSpec, RegisteredCommand};
use crate::config::ExecutorConfig;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::event::ExecutionEvent;
use crate::registry::CommandRegistry;
use crate::table::{ExecutionTable, TableGuard};

pub(crate) struct ExecutorShared {
    config: ExecutorConfig,
    registry: CommandRegistry,
    table: ExecutionTable,
    event_tx: broadcast::Sender<ExecutionEvent>,
}

/// Registers commands and runs them in the background.
///
/// Cloning is cheap; clones share the same registry and execution table.
/// Independent executors never see each other's commands or executions.
#[derive(Clone)]
pub struct CommandExecutor {
    shared: Arc<ExecutorShared>,
}

impl fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("config", &self.shared.config)
            .field("commands", &self.shared.registry.len())
            .field("executions", &self.execution_count())
            .finish()
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

/// Outcome of the locked admission phase of a start request.
enum Admission {
    Rejected(ExecutionState),
    Admitted(Arc<ExecutionContext>),
}

impl CommandExecutor {
    /// Creates a new executor with no registered commands.
    pub fn new(config: ExecutorConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            shared: Arc::new(ExecutorShared {
                config,
                registry: CommandRegistry::new(),
                table: ExecutionTable::new(),
                event_tx,
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<ExecutorShared>) -> Self {
        Self { shared }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.shared.config
    }

    /// Returns the command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.shared.registry
    }

    /// Registers a command. See [`CommandRegistry::register`].
    pub fn register(&self, spec: CommandSpec) -> Result<Arc<RegisteredCommand>> {
        self.shared.registry.register(spec)
    }

    /// Gets a registered command by name.
    pub fn command(&self, name: &str) -> Result<Arc<RegisteredCommand>> {
        self.shared.registry.get(name)
    }

    /// Returns a snapshot of all registered commands.
    pub fn commands(&self) -> Vec<Arc<RegisteredCommand>> {
        self.shared.registry.commands()
    }

    /// Returns the public descriptors of all registered commands.
    pub fn command_descriptions(&self) -> Vec<CommandDescription> {
        self.shared.registry.descriptions()
    }

    /// Reports whether a new execution of `name` would be admitted right now.
    pub fn can_start(&self, name: &str) -> (bool, CommandAvailability) {
        let command = self.shared.registry.find(name);
        let mut availability = admission::evaluate_predicate(command.as_deref(), self);
        if let Some(command) = command.filter(|_| availability.is_possible()) {
            availability = admission::check_limit(&command, &self.shared.table.lock().view());
        }
        (availability.is_possible(), availability)
    }

    /// Starts a new execution of `name` and waits up to `sync_wait` for it
    /// to finish.
    ///
    /// Always returns a state record. A denied request comes back with the
    /// matching `Rejected*` status and is not tracked, so its id is unknown
    /// to [`latest_state`](Self::latest_state). Otherwise the record is the
    /// one observed when the execution finished or the budget ran out,
    /// whichever came first.
    pub async fn start_execution(
        &self,
        name: &str,
        arguments: Option<Vec<String>>,
        sync_wait: Duration,
    ) -> ExecutionState {
        let context = match self.admit(name, arguments.unwrap_or_default()) {
            Admission::Rejected(state) => return state,
            Admission::Admitted(context) => context,
        };

        let mut state_rx = context.subscribe();
        context.start();

        if !sync_wait.is_zero() {
            // Timing out is the normal "still running" path.
            let _ = tokio::time::timeout(sync_wait, state_rx.wait_for(|s| s.is_done())).await;
        }

        context.state()
    }

    /// Sweeps orphans, runs the command's predicate with no lock held, then
    /// checks the concurrency limit and inserts the new context under one
    /// hold of the table lock.
    fn admit(&self, name: &str, arguments: Vec<String>) -> Admission {
        let command = self.shared.registry.find(name);
        let state = ExecutionState::queued(name);

        self.sweep(&mut self.shared.table.lock());

        let availability = admission::evaluate_predicate(command.as_deref(), self);
        let command = match (command, availability.rejection_status()) {
            (Some(command), None) => command,
            (_, rejection) => return self.reject(state, rejection, availability),
        };

        let mut table = self.shared.table.lock();
        let availability = admission::check_limit(&command, &table.view());
        if let Some(rejection) = availability.rejection_status() {
            drop(table);
            return self.reject(state, Some(rejection), availability);
        }

        debug!(
            execution_id = %state.execution_id,
            command = %name,
            "execution admitted"
        );
        let context = ExecutionContext::new(
            command,
            arguments,
            state,
            Arc::downgrade(&self.shared),
            self.shared.event_tx.clone(),
        );
        table.insert(Arc::clone(&context));

        Admission::Admitted(context)
    }

    fn reject(
        &self,
        mut state: ExecutionState,
        rejection: Option<InvocationStatus>,
        availability: CommandAvailability,
    ) -> Admission {
        state.invocation_state =
            rejection.unwrap_or(InvocationStatus::RejectedPermanentlyUnavailable);
        debug!(
            execution_id = %state.execution_id,
            command = %state.command_name,
            availability = availability.name(),
            "execution rejected"
        );
        self.emit_event(ExecutionEvent::Rejected {
            execution_id: state.execution_id.clone(),
            command: state.command_name.clone(),
            status: state.invocation_state,
        });
        Admission::Rejected(state)
    }

    /// Returns a snapshot of the execution's state record, or `None` if the
    /// id is unknown or was evicted. Refreshes the execution's last access.
    pub fn latest_state(&self, id: &ExecutionId) -> Option<ExecutionState> {
        let table = self.shared.table.lock();
        let context = table.get(id)?;
        context.touch();
        Some(context.state())
    }

    /// Requests cooperative cancellation of an execution.
    ///
    /// Returns the state record after the request, or `None` if the id is
    /// unknown. A finished execution is left unchanged.
    pub fn request_cancellation(&self, id: &ExecutionId) -> Option<ExecutionState> {
        let context = {
            let table = self.shared.table.lock();
            Arc::clone(table.get(id)?)
        };

        if context.request_cancellation() {
            debug!(
                execution_id = %id,
                command = %context.command_name(),
                cancellation_possible = context.cancellation_possible(),
                "cancellation requested"
            );
            self.emit_event(ExecutionEvent::CancellationRequested {
                execution_id: id.clone(),
            });
        }

        Some(context.state())
    }

    /// Evicts every orphaned execution now and returns how many were removed.
    pub fn cleanup_orphaned_executions(&self) -> usize {
        let mut table = self.shared.table.lock();
        self.sweep(&mut table)
    }

    /// Number of executions that are queued or in progress.
    pub fn count_concurrent_executions(&self) -> usize {
        self.shared.table.lock().view().concurrent_executions()
    }

    /// Number of executions of `name` that are queued or in progress.
    pub fn count_concurrent_executions_of(&self, name: &str) -> usize {
        self.shared
            .table
            .lock()
            .view()
            .concurrent_executions_of(name)
    }

    /// Number of tracked executions, finished ones included.
    pub fn execution_count(&self) -> usize {
        self.shared.table.lock().len()
    }

    /// Subscribes to execution events.
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.shared.event_tx.subscribe()
    }

    pub(crate) fn emit_event(&self, event: ExecutionEvent) {
        // Ignore send errors (no receivers)
        let _ = self.shared.event_tx.send(event);
    }

    fn sweep(&self, table: &mut TableGuard<'_>) -> usize {
        let evicted = table.sweep(self.shared.config.retention, Instant::now());
        if evicted.is_empty() {
            return 0;
        }

        debug!(
            count = evicted.len(),
            remaining = table.len(),
            "evicted orphaned executions"
        );
        let count = evicted.len();
        for execution_id in evicted {
            self.emit_event(ExecutionEvent::Evicted { execution_id });
        }
        count
    }
}
