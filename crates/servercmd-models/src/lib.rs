//! Core data models for servercmd.
//!
//! This crate provides the types exchanged between the execution engine and
//! its callers: execution state records, command descriptions, and the
//! status / availability codes that travel over the wire as plain integers.

pub mod description;
pub mod ids;
pub mod state;
pub mod status;

// Re-export main types
pub use description::CommandDescription;
pub use ids::ExecutionId;
pub use state::ExecutionState;
pub use status::{CommandAvailability, InvocationStatus, UnknownCodeError};
