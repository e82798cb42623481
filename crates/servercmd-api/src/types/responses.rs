//! Response DTOs for the API.

use serde::Serialize;

use servercmd_models::{CommandAvailability, CommandDescription};

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Number of registered commands.
    pub commands: usize,
    /// Number of queued or running executions.
    pub running_executions: usize,
}

/// Command list response.
#[derive(Debug, Clone, Serialize)]
pub struct CommandListResponse {
    /// Registered commands, sorted by name.
    pub commands: Vec<CommandDescription>,
    /// Total count.
    pub total: usize,
}

impl From<Vec<CommandDescription>> for CommandListResponse {
    fn from(mut commands: Vec<CommandDescription>) -> Self {
        commands.sort_by(|a, b| a.command_name.cmp(&b.command_name));
        let total = commands.len();
        Self { commands, total }
    }
}

/// Command availability response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    /// Command name as requested.
    pub command_name: String,
    /// Whether a start request would be admitted now.
    pub can_start: bool,
    /// Reason name.
    pub reason: String,
    /// Reason wire code.
    pub reason_code: u8,
}

impl AvailabilityResponse {
    /// Builds the response for `command_name`.
    pub fn new(command_name: impl Into<String>, availability: CommandAvailability) -> Self {
        Self {
            command_name: command_name.into(),
            can_start: availability.is_possible(),
            reason: availability.name().to_string(),
            reason_code: availability.code(),
        }
    }
}
