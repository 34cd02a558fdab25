use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::media::MediaError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error envelope returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Mirrors the HTTP status code.
    #[schema(example = 400)]
    pub status_code: u16,
    /// Human-readable error description.
    #[schema(example = "Invalid video ID format")]
    pub message: String,
    /// Always `false`.
    #[schema(example = false)]
    pub success: bool,
    /// Additional error details. Usually empty.
    pub errors: Vec<String>,
    /// Internal failure detail, only populated in debug builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    /// Credentials or a session token were presented but rejected.
    Unauthorized(String),
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TokenMissing | AppError::TokenInvalid | AppError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorBody {
        let status_code = self.status().as_u16();
        let (message, stack) = match self {
            AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => (msg, None),
            AppError::TokenMissing => ("Unauthorized request".into(), None),
            AppError::TokenInvalid => ("Invalid or expired token".into(), None),
            AppError::PermissionDenied => (
                "You are not allowed to modify this resource".into(),
                None,
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                let stack = cfg!(debug_assertions).then_some(detail);
                ("Something went wrong".into(), stack)
            }
        };

        ErrorBody {
            status_code,
            message,
            success: false,
            errors: Vec::new(),
            stack,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::Internal(format!("Failed to upload media: {err}"))
    }
}

/// Fallback handler for unknown routes.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".into())
}
