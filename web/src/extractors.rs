//! Custom Axum extractors.
//!
//! - `ValidatedJson`: JSON body whose rejections become `400` [`AppError`]s
//! - `TodoIdParam`: `{id}` path segment; an unparseable id is a `404`
//! - `CorrelationId`: The request's correlation ID
//!
//! # Examples
//!
//! ```ignore
//! async fn update_todo(
//!     State(state): State<AppState>,
//!     TodoIdParam(id): TodoIdParam,
//!     ValidatedJson(patch): ValidatedJson<TodoPatch>,
//! ) -> Result<Json<Todo>, AppError> {
//!     Ok(Json(state.todos.update(id, patch).await?))
//! }
//! ```

use crate::error::AppError;
use crate::middleware::correlation_id_from_headers;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use todo_core::TodoId;
use uuid::Uuid;

/// JSON request body.
///
/// Unlike `axum::Json`, every rejection (missing content type, syntax
/// error, wrong field type, unknown field) is reported as a `400` with the
/// usual error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "Rejected request body");
                Err(AppError::bad_request(rejection.body_text()))
            },
        }
    }
}

/// Todo id taken from the `{id}` path segment.
///
/// A segment that is not a valid id cannot name any record, so it is
/// rejected as not found.
#[derive(Debug, Clone, Copy)]
pub struct TodoIdParam(pub TodoId);

#[async_trait]
impl<S> FromRequestParts<S> for TodoIdParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::todo_not_found())?;

        raw.parse()
            .map(Self)
            .map_err(|_| AppError::todo_not_found())
    }
}

/// Correlation ID for request tracing.
///
/// Reads the ID the correlation middleware stored for this request. Without
/// the middleware, falls back to the `X-Correlation-ID` header, or a new
/// UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    pub(crate) fn from_parts(parts: &Parts) -> Self {
        if let Some(id) = parts.extensions.get::<Self>() {
            return *id;
        }

        Self(correlation_id_from_headers(&parts.headers).unwrap_or_else(Uuid::new_v4))
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
