//! Execution engine for servercmd.
//!
//! This crate runs named, server-side commands in the background:
//! - `CommandExecutor` - registry, admission control and the execution table
//! - `ExecutionContext` - one running invocation and its state record
//! - `procedure_command` - adapts a plain function into a command body
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use servercmd_runtime::{ArgumentSpec, CommandExecutor, ExecutorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = CommandExecutor::new(ExecutorConfig::default());
//!
//!     executor.register_procedure(
//!         "Evaluate",
//!         ArgumentSpec::new(["id", "sleepMs"]),
//!         |args, _| {
//!             let ms: u64 = args[1].parse()?;
//!             std::thread::sleep(Duration::from_millis(ms));
//!             Ok(())
//!         },
//!         Some(2),
//!     )?;
//!
//!     let args = vec!["42".to_string(), "600".to_string()];
//!     let state = executor
//!         .start_execution("Evaluate", Some(args), Duration::from_millis(100))
//!         .await;
//!
//!     // Poll until done
//!     while let Some(latest) = executor.latest_state(&state.execution_id) {
//!         if latest.is_done() {
//!             println!("finished: {:?}", latest.invocation_state);
//!             break;
//!         }
//!         tokio::time::sleep(Duration::from_millis(100)).await;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Key Concepts
//!
//! ## Admission
//!
//! Each command may carry an availability predicate and a concurrency
//! limit. The predicate is called with the executor before any lock is
//! taken, so it may query running executions. The limit is checked while
//! the execution table is locked, and a new context is inserted under the
//! same lock, so concurrent starts cannot jointly exceed it. Denied
//! requests get a terminal `Rejected*` record and are never tracked.
//!
//! ## Retention
//!
//! Finished executions stay readable until they have not been accessed for
//! the configured retention window. Orphans are swept at the start of every
//! `start_execution` call; there is no background timer.
//!
//! ## Cancellation
//!
//! Cancellation is cooperative. A request raises a flag and cancels the
//! execution's token; the body decides whether and when to stop.

mod admission;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod executor;
pub mod procedure;
pub mod registry;
mod table;

pub use command::{
    AvailabilityPredicate, CommandBody, CommandError, CommandSpec, InvocationResult,
    RegisteredCommand,
};
pub use config::ExecutorConfig;
pub use context::ExecutionContext;
pub use error::{Result, RuntimeError};
pub use event::ExecutionEvent;
pub use executor::CommandExecutor;
pub use procedure::{procedure_command, ArgumentSpec, MISSING_ARGUMENT};
pub use registry::CommandRegistry;
pub use tokio_util::sync::CancellationToken;
