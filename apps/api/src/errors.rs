use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::draw::DrawError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient participants: {0}")]
    InsufficientParticipants(usize),

    #[error("No feasible assignment after {0} attempts")]
    NoFeasibleAssignment(u32),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DrawError> for AppError {
    fn from(err: DrawError) -> Self {
        match err {
            DrawError::InsufficientParticipants { count } => {
                AppError::InsufficientParticipants(count)
            }
            DrawError::NoFeasibleAssignment { attempts } => {
                AppError::NoFeasibleAssignment(attempts)
            }
            DrawError::Persistence(e) => AppError::Storage(e.to_string()),
            DrawError::Directory(e) => AppError::Storage(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InsufficientParticipants(count) => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_PARTICIPANTS",
                format!("A draw needs at least two participants, got {count}"),
            ),
            AppError::NoFeasibleAssignment(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_FEASIBLE_ASSIGNMENT",
                "No valid assignment was found. The exclusions may be too tight; relax them and try again."
                    .to_string(),
            ),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
