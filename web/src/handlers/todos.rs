//! HTTP handlers for the todo CRUD API.
//!
//! Handlers only translate between HTTP and [`TodoService`](crate::service::TodoService);
//! validation and persistence happen there.

use crate::error::AppError;
use crate::extractors::{CorrelationId, TodoIdParam, ValidatedJson};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use todo_core::{CreateTodoRequest, Todo, TodoPatch};

/// Body returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTodoResponse {
    /// Confirmation text
    pub message: String,
}

/// List all todos, newest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/todos
/// ```
#[tracing::instrument(skip_all, fields(correlation_id = %correlation_id))]
pub async fn list_todos(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(state.todos.list().await?))
}

/// Create a todo.
///
/// # Endpoint
///
/// ```text
/// POST /api/todos
/// Content-Type: application/json
///
/// { "text": "buy milk", "completed": false }
/// ```
///
/// Responds `201 Created` with the stored todo.
#[tracing::instrument(skip_all, fields(correlation_id = %correlation_id))]
pub async fn create_todo(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ValidatedJson(request): ValidatedJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let todo = state.todos.create(request).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Partially update a todo.
///
/// # Endpoint
///
/// ```text
/// PATCH /api/todos/:id
/// Content-Type: application/json
///
/// { "completed": true }
/// ```
///
/// Only `text` and `completed` may be sent; anything else is a `400`.
#[tracing::instrument(skip_all, fields(correlation_id = %correlation_id, todo_id = %id))]
pub async fn update_todo(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    TodoIdParam(id): TodoIdParam,
    ValidatedJson(patch): ValidatedJson<TodoPatch>,
) -> Result<Json<Todo>, AppError> {
    Ok(Json(state.todos.update(id, patch).await?))
}

/// Delete a todo.
///
/// # Endpoint
///
/// ```text
/// DELETE /api/todos/:id
/// ```
#[tracing::instrument(skip_all, fields(correlation_id = %correlation_id, todo_id = %id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    TodoIdParam(id): TodoIdParam,
) -> Result<Json<DeleteTodoResponse>, AppError> {
    state.todos.delete(id).await?;
    Ok(Json(DeleteTodoResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}
