//! Command handlers.

use axum::{
    extract::{Path, State},
    Json,
};

use servercmd_models::CommandDescription;

use crate::error::Result;
use crate::state::AppState;
use crate::types::{AvailabilityResponse, CommandListResponse};

/// GET /api/commands - List all registered commands.
pub async fn list_commands(State(state): State<AppState>) -> Json<CommandListResponse> {
    Json(CommandListResponse::from(
        state.executor.command_descriptions(),
    ))
}

/// GET /api/commands/:name - Describe one command.
pub async fn get_command(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CommandDescription>> {
    let command = state.executor.command(&name)?;
    Ok(Json(command.to_description()))
}

/// GET /api/commands/:name/availability - Check whether a start would be admitted.
pub async fn command_availability(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<AvailabilityResponse> {
    let (_, availability) = state.executor.can_start(&name);
    Json(AvailabilityResponse::new(name, availability))
}
