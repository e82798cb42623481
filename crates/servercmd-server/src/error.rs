//! Server error types.

use thiserror::Error;

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Setting up the engine failed.
    #[error("runtime error: {0}")]
    Runtime(#[from] servercmd_runtime::RuntimeError),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
