//! Registering plain procedures as commands.
//!
//! A procedure is a function over the argument list and a cancellation
//! token. [`procedure_command`] wraps it into a full command body that
//! checks the argument count, declares cancellation support and maps the
//! procedure's return to an invocation outcome.
//!
//! A cancellation-aware procedure that returns after cancellation was
//! requested is reported as `Canceled`, whether it returned an error or
//! finished its work regularly.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::command::{CommandError, CommandSpec, InvocationResult, RegisteredCommand};
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::executor::CommandExecutor;

/// Status message of an execution started with too few arguments.
pub const MISSING_ARGUMENT: &str = "missing argument";

/// Declared arguments of a procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSpec {
    names: Vec<String>,
    description: String,
    cancellable: bool,
}

impl ArgumentSpec {
    /// Declares the argument names. Their count is the minimum number of
    /// arguments an execution must be started with.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A procedure taking no arguments.
    pub fn none() -> Self {
        Self::default()
    }

    /// Marks the procedure as observing its cancellation token.
    pub fn cancellable(mut self) -> Self {
        self.cancellable = true;
        self
    }

    /// Sets the command description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the declared argument names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if the procedure observes cancellation.
    pub fn is_cancellable(&self) -> bool {
        self.cancellable
    }
}

/// Builds a command spec running `procedure`.
///
/// `concurrency_limit` of `None` leaves the command unlimited.
pub fn procedure_command<F>(
    name: impl Into<String>,
    arguments: ArgumentSpec,
    procedure: F,
    concurrency_limit: Option<usize>,
) -> CommandSpec
where
    F: Fn(&[String], &CancellationToken) -> std::result::Result<(), CommandError>
        + Send
        + Sync
        + 'static,
{
    let required = arguments.names.len();
    let cancellable = arguments.cancellable;
    let procedure = Arc::new(procedure);

    let spec = CommandSpec::new(name, move |ctx: &ExecutionContext| {
        if ctx.arguments().len() < required {
            ctx.report_progress(0, 0, Some(MISSING_ARGUMENT));
            return Ok(InvocationResult::Failed);
        }

        if cancellable {
            ctx.set_cancellation_possible(true);
        }

        let outcome = procedure(ctx.arguments(), ctx.cancellation_token());

        if ctx.cancellation_possible() && ctx.is_cancellation_requested() {
            if let Err(err) = outcome {
                debug!(
                    execution_id = %ctx.execution_id(),
                    error = %err,
                    "error after cancellation"
                );
            }
            return Ok(InvocationResult::Canceled);
        }
        outcome.map(|()| InvocationResult::Completed)
    })
    .with_arguments(arguments.names)
    .with_description(arguments.description);

    match concurrency_limit {
        Some(limit) => spec.with_concurrency_limit(limit),
        None => spec,
    }
}

impl CommandExecutor {
    /// Registers `procedure` as a command. See [`procedure_command`].
    pub fn register_procedure<F>(
        &self,
        name: impl Into<String>,
        arguments: ArgumentSpec,
        procedure: F,
        concurrency_limit: Option<usize>,
    ) -> Result<Arc<RegisteredCommand>>
    where
        F: Fn(&[String], &CancellationToken) -> std::result::Result<(), CommandError>
            + Send
            + Sync
            + 'static,
    {
        self.register(procedure_command(
            name,
            arguments,
            procedure,
            concurrency_limit,
        ))
    }
}
