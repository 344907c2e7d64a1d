//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Readiness response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// `"ready"` or `"unavailable"`
    pub status: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check the store.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness check against the Entity Store.
///
/// # Status Codes
///
/// - 200 OK: The store answered a ping
/// - 503 Service Unavailable: The store did not answer
///
/// # Endpoint
///
/// ```text
/// GET /health/ready
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    if state.todos.is_ready().await {
        (StatusCode::OK, Json(Readiness { status: "ready" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Readiness {
                status: "unavailable",
            }),
        )
    }
}
