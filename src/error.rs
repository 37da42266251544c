use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// The message shown to callers, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::Database(_) | AppError::Internal | AppError::InternalWithMsg(_) => {
                "Internal error".to_string()
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db_err| db_err.code())
        // 2067/1555 = SQLite unique/primary key constraint, 23505 = PostgreSQL unique violation
        .is_some_and(|code| code == "2067" || code == "1555" || code == "23505")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) if is_unique_violation(e) => {
                warn!("Unique constraint violated: {:?}", e);
                (StatusCode::CONFLICT, "Resource already exists (duplicate entry)".to_string())
            }
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.message())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.message()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.message()),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, self.message()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.message()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.message()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, self.message()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, self.message())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
