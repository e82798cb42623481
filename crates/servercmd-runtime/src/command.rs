//! Registered commands and their invocation bodies.

use std::fmt;
use std::sync::Arc;

use servercmd_models::{CommandAvailability, CommandDescription, InvocationStatus};

use crate::context::ExecutionContext;
use crate::executor::CommandExecutor;

/// Error type a command body may return. Its `Display` output becomes the
/// status message of the failed execution.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// The invocation body of a command.
pub type CommandBody =
    Arc<dyn Fn(&ExecutionContext) -> Result<InvocationResult, CommandError> + Send + Sync>;

/// Admission predicate attached to a command.
///
/// Called with the executor and the command name before any engine lock is
/// taken, so it may query the executor.
pub type AvailabilityPredicate =
    Arc<dyn Fn(&CommandExecutor, &str) -> CommandAvailability + Send + Sync>;

/// Outcome a command body reports when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationResult {
    /// The work was done.
    Completed,
    /// The body stopped because cancellation was requested.
    Canceled,
    /// The body gave up; details belong in the status message.
    Failed,
}

impl InvocationResult {
    /// Returns the terminal status this outcome maps to.
    pub fn status(self) -> InvocationStatus {
        match self {
            InvocationResult::Completed => InvocationStatus::Completed,
            InvocationResult::Canceled => InvocationStatus::Canceled,
            InvocationResult::Failed => InvocationStatus::FailedDuringExecution,
        }
    }
}

/// Everything needed to register a command.
pub struct CommandSpec {
    name: String,
    argument_names: Vec<String>,
    description: String,
    body: CommandBody,
    availability: Option<AvailabilityPredicate>,
    concurrency_limit: Option<usize>,
}

impl CommandSpec {
    /// Creates a spec for a command with the given name and body.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Result<InvocationResult, CommandError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            argument_names: Vec::new(),
            description: String::new(),
            body: Arc::new(body),
            availability: None,
            concurrency_limit: None,
        }
    }

    /// Sets the informational argument names.
    pub fn with_arguments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argument_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the description text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attaches an admission predicate.
    pub fn with_availability<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&CommandExecutor, &str) -> CommandAvailability + Send + Sync + 'static,
    {
        self.availability = Some(Arc::new(predicate));
        self
    }

    /// Limits the number of concurrently running executions of this command.
    ///
    /// The limit is checked under the execution table lock, atomically with
    /// inserting the new execution.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = Some(limit);
        self
    }

    /// Returns the command name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A command known to the executor. Immutable once registered.
pub struct RegisteredCommand {
    name: String,
    argument_names: Vec<String>,
    description: String,
    body: CommandBody,
    availability: Option<AvailabilityPredicate>,
    concurrency_limit: Option<usize>,
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("name", &self.name)
            .field("argument_names", &self.argument_names)
            .field("description", &self.description)
            .field("availability", &self.availability.is_some())
            .field("concurrency_limit", &self.concurrency_limit)
            .finish()
    }
}

impl From<CommandSpec> for RegisteredCommand {
    fn from(spec: CommandSpec) -> Self {
        Self {
            name: spec.name,
            argument_names: spec.argument_names,
            description: spec.description,
            body: spec.body,
            availability: spec.availability,
            concurrency_limit: spec.concurrency_limit,
        }
    }
}

impl RegisteredCommand {
    /// Returns the unique command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the informational argument names.
    pub fn argument_names(&self) -> &[String] {
        &self.argument_names
    }

    /// Returns the description text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns true if a predicate or a concurrency limit guards admission.
    pub fn has_availability_check(&self) -> bool {
        self.availability.is_some() || self.concurrency_limit.is_some()
    }

    /// Returns the concurrency limit, if any.
    pub fn concurrency_limit(&self) -> Option<usize> {
        self.concurrency_limit
    }

    /// Returns the public descriptor.
    pub fn to_description(&self) -> CommandDescription {
        CommandDescription {
            command_name: self.name.clone(),
            argument_names: self.argument_names.clone(),
            description: self.description.clone(),
        }
    }

    pub(crate) fn invoke(
        &self,
        context: &ExecutionContext,
    ) -> Result<InvocationResult, CommandError> {
        (self.body)(context)
    }

    pub(crate) fn availability(&self) -> Option<&AvailabilityPredicate> {
        self.availability.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_result_status() {
        assert_eq!(
            InvocationResult::Completed.status(),
            InvocationStatus::Completed
        );
        assert_eq!(InvocationResult::Canceled.status(), InvocationStatus::Canceled);
        assert_eq!(
            InvocationResult::Failed.status(),
            InvocationStatus::FailedDuringExecution
        );
    }

    #[test]
    fn test_spec_into_registered_command() {
        let spec = CommandSpec::new("Evaluate", |_| Ok(InvocationResult::Completed))
            .with_arguments(["id", "sleepMs"])
            .with_description("evaluates a record")
            .with_concurrency_limit(2);
        assert_eq!(spec.name(), "Evaluate");

        let command = RegisteredCommand::from(spec);
        assert_eq!(command.name(), "Evaluate");
        assert_eq!(command.argument_names(), ["id", "sleepMs"]);
        assert_eq!(command.description(), "evaluates a record");
        assert!(command.has_availability_check());
        assert_eq!(command.concurrency_limit(), Some(2));
    }

    #[test]
    fn test_to_description() {
        let command = RegisteredCommand::from(CommandSpec::new("Echo", |_| {
            Ok(InvocationResult::Completed)
        }));

        let desc = command.to_description();
        assert_eq!(desc.command_name, "Echo");
        assert!(desc.argument_names.is_empty());
        assert_eq!(desc.description, "");
        assert!(!command.has_availability_check());
    }

    #[test]
    fn test_debug_hides_body() {
        let command = RegisteredCommand::from(CommandSpec::new("Echo", |_| {
            Ok(InvocationResult::Completed)
        }));
        let debug = format!("{:?}", command);
        assert!(debug.contains("Echo"));
        assert!(debug.contains("availability: false"));
    }
}
