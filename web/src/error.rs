//! Error types for web handlers.
//!
//! This module bridges service errors and HTTP responses, implementing
//! Axum's `IntoResponse` trait.
//!
//! Every error body carries `message` and `code`. Server errors additionally
//! carry `error`, the detail of the underlying failure.

use crate::service::ServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use todo_core::{RepositoryError, ValidationError};

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(id: TodoIdParam) -> Result<Json<Todo>, AppError> {
///     let todo = state.todos.update(id.0, patch).await?;
///     Ok(Json(todo))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Underlying failure, reported as `error` on server errors
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 400 error for input that failed validation.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create the 404 returned for an unknown todo.
    #[must_use]
    pub fn todo_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Todo not found".to_string(),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// HTTP status of this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code of this error
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Human-readable error message.
    message: String,
    /// Error code (for client error handling).
    code: String,
    /// Failure detail, server errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = if self.status.is_server_error() {
            let detail = self
                .source
                .as_ref()
                .map_or_else(|| self.message.clone(), ToString::to_string);
            tracing::error!(
                status = %self.status,
                code = %self.code,
                error = %detail,
                "Internal server error"
            );
            Some(detail)
        } else {
            tracing::debug!(status = %self.status, code = %self.code, message = %self.message, "Request rejected");
            None
        };

        let body = ErrorResponse {
            message: self.message,
            code: self.code,
            error,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("Server error").with_source(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(err) => err.into(),
            ServiceError::NotFound => Self::todo_not_found(),
            ServiceError::Store(detail) => anyhow::anyhow!(detail).into(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        ServiceError::from(err).into()
    }
}
