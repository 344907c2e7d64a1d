//! HTTP router.
//!
//! Composes the todo and health handlers with the shared middleware stack.

use crate::handlers::{self, todos};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Todo API routes, to be nested under `/api`.
///
/// # Routes
///
/// - `GET /todos` - List todos
/// - `POST /todos` - Create a todo
/// - `PATCH /todos/:id` - Update a todo
/// - `DELETE /todos/:id` - Delete a todo
pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/:id",
            patch(todos::update_todo).delete(todos::delete_todo),
        )
}

/// Build the full application router.
///
/// - `/health`, `/health/ready` - Liveness and readiness
/// - `/api/...` - See [`todo_routes`]
///
/// Every route is wrapped in permissive CORS, HTTP tracing and correlation
/// ID tracking.
///
/// # Example
///
/// ```rust,ignore
/// let app = build_router(AppState::new(repository));
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// ```
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness_check))
        .nest("/api", todo_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(correlation_id_layer())
}
