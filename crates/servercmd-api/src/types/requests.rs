//! Request DTOs for the API.

use serde::Deserialize;

/// Start execution request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExecutionRequest {
    /// Positional arguments. Absent means none.
    pub arguments: Option<Vec<String>>,
    /// Synchronous-wait budget in milliseconds.
    pub sync_wait_ms: Option<u64>,
}
