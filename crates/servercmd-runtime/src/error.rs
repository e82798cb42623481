//! Error types for the runtime crate.

use thiserror::Error;

/// Errors that can occur in the runtime.
///
/// Only registration and command lookup fail with an error. Admission
/// denials and failing command bodies are reported through the execution
/// state instead.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A command with this name is already registered.
    #[error("there is already a registered command named '{0}'")]
    DuplicateCommand(String),

    /// No command with this name is registered.
    #[error("there is no registered command named '{0}'")]
    CommandNotFound(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
