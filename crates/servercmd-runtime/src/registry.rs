//! Name-keyed registry of commands.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use servercmd_models::CommandDescription;
use tracing::debug;

use crate::command::{CommandSpec, RegisteredCommand};
use crate::error::{Result, RuntimeError};

/// Registry of commands keyed by their exact, case-sensitive name.
///
/// Commands are never removed. Every read and write goes through one
/// registry-wide lock, and no user code runs while it is held.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Arc<RegisteredCommand>>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command.
    ///
    /// Fails with [`RuntimeError::DuplicateCommand`] if the name is taken;
    /// the already registered command is kept.
    pub fn register(&self, spec: CommandSpec) -> Result<Arc<RegisteredCommand>> {
        let mut commands = self
            .commands
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if commands.contains_key(spec.name()) {
            return Err(RuntimeError::DuplicateCommand(spec.name().to_string()));
        }

        let command = Arc::new(RegisteredCommand::from(spec));
        commands.insert(command.name().to_string(), Arc::clone(&command));

        debug!(
            command = %command.name(),
            arguments = ?command.argument_names(),
            availability_check = command.has_availability_check(),
            "command registered"
        );

        Ok(command)
    }

    /// Gets a command by name.
    pub fn get(&self, name: &str) -> Result<Arc<RegisteredCommand>> {
        self.find(name)
            .ok_or_else(|| RuntimeError::CommandNotFound(name.to_string()))
    }

    /// Gets a command by name, if registered.
    pub fn find(&self, name: &str) -> Option<Arc<RegisteredCommand>> {
        let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        commands.get(name).cloned()
    }

    /// Returns a snapshot of all registered commands.
    pub fn commands(&self) -> Vec<Arc<RegisteredCommand>> {
        let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        commands.values().cloned().collect()
    }

    /// Returns a snapshot of all public descriptors, in no particular order.
    pub fn descriptions(&self) -> Vec<CommandDescription> {
        let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        commands.values().map(|c| c.to_description()).collect()
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
