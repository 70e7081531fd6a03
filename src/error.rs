use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::db::DatabaseError;
use crate::scheduling::SchedulingError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Slot conflict: {0}")]
    SlotConflict(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Validation(message) => AppError::Validation(message),
            SchedulingError::Conflict(message) => AppError::SlotConflict(message),
            SchedulingError::NotFound(message) => AppError::NotFound(message),
            SchedulingError::Forbidden(message) => AppError::Authorization(message),
            err @ SchedulingError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            SchedulingError::Storage(err) => AppError::Database(err),
        }
    }
}

impl AppError {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "internal_error",
            AppError::Authentication(_) => "unauthenticated",
            AppError::Authorization(_) => "forbidden",
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::SlotConflict(_) => "slot_conflict",
            AppError::Conflict(_) => "conflict",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref err) => {
                error!("Database error: {}", err);
                match err {
                    DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                    DatabaseError::Duplicate(_) => (StatusCode::CONFLICT, "Resource already exists"),
                    DatabaseError::ConnectionError(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
                    }
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal server error occurred",
                    ),
                }
            }
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            AppError::SlotConflict(_) => (
                StatusCode::CONFLICT,
                "The selected slot is no longer available",
            ),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "Resource conflict"),
        };

        // Storage failures are logged above, not echoed back.
        let details = match &self {
            AppError::Database(_) => error_message.to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": error_message,
                "details": details,
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
