//! The servercmd server.
//!
//! Wires a [`CommandExecutor`](servercmd_runtime::CommandExecutor) with the
//! demo commands to the HTTP API.

pub mod cli;
pub mod demo;
pub mod error;

pub use cli::Cli;
pub use error::{Result, ServerError};
