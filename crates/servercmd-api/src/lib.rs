//! HTTP API for servercmd.
//!
//! This crate exposes a [`CommandExecutor`](servercmd_runtime::CommandExecutor)
//! over REST:
//! - Command listing and availability checks
//! - Starting executions with a synchronous-wait budget
//! - Polling and cancelling executions
//!
//! # Example
//!
//! ```ignore
//! use servercmd_api::{serve, ApiConfig, AppState};
//! use servercmd_runtime::CommandExecutor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = CommandExecutor::default();
//!     // register commands ...
//!
//!     let config = ApiConfig::default();
//!     let state = AppState::new(config.clone(), executor);
//!     serve(config, state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
