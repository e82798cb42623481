//! Execution handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use tracing::debug;

use servercmd_models::{ExecutionId, ExecutionState};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::StartExecutionRequest;

/// POST /api/commands/:name/executions - Start an execution.
///
/// Admission denials are not errors: the returned record carries the
/// `Rejected*` status. An empty body starts with no arguments and the
/// default sync wait.
pub async fn start_execution(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ExecutionState>> {
    let req = parse_start_request(&body)?;
    let sync_wait = state.config.sync_wait(req.sync_wait_ms);

    debug!(command = %name, sync_wait_ms = sync_wait.as_millis() as u64, "start requested");
    let execution = state
        .executor
        .start_execution(&name, req.arguments, sync_wait)
        .await;

    Ok(Json(execution))
}

fn parse_start_request(body: &[u8]) -> Result<StartExecutionRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StartExecutionRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::BadRequest(format!("invalid request body: {}", err)))
}

/// GET /api/executions/:id - Get the latest state of an execution.
pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExecutionState>> {
    let execution = state
        .executor
        .latest_state(&ExecutionId::from_string(id.as_str()))
        .ok_or_else(|| ApiError::execution_gone(&id))?;

    Ok(Json(execution))
}

/// POST /api/executions/:id/cancel - Request cooperative cancellation.
pub async fn cancel_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExecutionState>> {
    let execution = state
        .executor
        .request_cancellation(&ExecutionId::from_string(id.as_str()))
        .ok_or_else(|| ApiError::execution_gone(&id))?;

    Ok(Json(execution))
}
