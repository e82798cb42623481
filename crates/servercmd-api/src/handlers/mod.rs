//! API request handlers.

pub mod commands;
pub mod executions;
pub mod health;

pub use commands::*;
pub use executions::*;
pub use health::*;
