//! Axum route handlers for the Draw API.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::draw::engine::AssignmentMap;
use crate::draw::errors::DrawError;
use crate::draw::exclusions::ExclusionPair;
use crate::draw::store::DrawRecord;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RunDrawRequest {
    /// Falls back to the users file when omitted.
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    /// One exclusion per line, e.g. `Ana -> Luis`.
    #[serde(default)]
    pub exclusions: String,
}

#[derive(Debug, Serialize)]
pub struct RunDrawResponse {
    pub assignments: AssignmentMap,
    pub attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<String>,
}

/// Runs store and search work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DrawError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in draw: {e}")))?
        .map_err(AppError::from)
}

/// GET /api/v1/draw
pub async fn handle_get_draw(State(state): State<AppState>) -> Result<Json<DrawRecord>, AppError> {
    let draws = state.draws.clone();
    let record = blocking(move || draws.get_draw_state()).await?;
    Ok(Json(record))
}

/// POST /api/v1/draw
pub async fn handle_run_draw(
    State(state): State<AppState>,
    Json(req): Json<RunDrawRequest>,
) -> Result<Json<RunDrawResponse>, AppError> {
    let participants = match req.participants {
        Some(list) => {
            if list.iter().any(|name| name.trim().is_empty()) {
                return Err(AppError::Validation(
                    "participant names must not be blank".to_string(),
                ));
            }
            list
        }
        None => {
            let users = state.users.clone();
            blocking(move || users.participants().map_err(DrawError::from)).await?
        }
    };

    let draws = state.draws.clone();
    let exclusions = req.exclusions;
    let assignment = blocking(move || draws.run_draw(&participants, &exclusions)).await?;

    Ok(Json(RunDrawResponse {
        assignments: assignment.mapping,
        attempts: assignment.attempts,
    }))
}

/// POST /api/v1/draw/reset
pub async fn handle_reset_draw(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let draws = state.draws.clone();
    blocking(move || draws.reset_draw()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/draw/exclusions
/// Every exclusion supplied to a committed draw, kept across resets.
pub async fn handle_get_exclusions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExclusionPair>>, AppError> {
    let draws = state.draws.clone();
    let record = blocking(move || draws.get_draw_state()).await?;
    Ok(Json(record.forbidden_pair_list()))
}

/// GET /api/v1/draw/participants
pub async fn handle_list_participants(
    State(state): State<AppState>,
) -> Result<Json<ParticipantsResponse>, AppError> {
    let users = state.users.clone();
    let participants = blocking(move || users.participants().map_err(DrawError::from)).await?;
    Ok(Json(ParticipantsResponse { participants }))
}
