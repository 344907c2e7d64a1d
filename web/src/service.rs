//! The CRUD service over the Entity Store.
//!
//! [`TodoService`] holds no state of its own: every call validates its input
//! and goes straight to the repository, so requests stay independent.

use std::sync::Arc;
use thiserror::Error;
use todo_core::{
    CreateTodoRequest, RepositoryError, Todo, TodoId, TodoPatch, TodoRepository, ValidationError,
};

/// Failure categories of a CRUD operation.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Input rejected before reaching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The targeted record does not exist
    #[error("Todo not found")]
    NotFound,

    /// The store failed
    #[error("Store failure: {0}")]
    Store(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(_) => Self::NotFound,
            RepositoryError::Database(message) => Self::Store(message),
        }
    }
}

/// List, create, update and delete over a shared repository.
#[derive(Clone)]
pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
}

impl TodoService {
    /// Create a service over `repository`
    #[must_use]
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }

    /// All todos, newest first.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Store`] if the store fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Todo>, ServiceError> {
        let todos = self.repository.find_all().await?;
        tracing::debug!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    /// Validate and persist a new todo.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] if `text` is missing or blank (nothing is persisted)
    /// - [`ServiceError::Store`] if the store fails
    #[tracing::instrument(skip(self, request))]
    pub async fn create(&self, request: CreateTodoRequest) -> Result<Todo, ServiceError> {
        let new = request.validate()?;
        let todo = self.repository.insert(new).await?;
        tracing::info!(todo_id = %todo.id, "Todo created");
        metrics::counter!("todo_service.operations.total", "operation" => "create").increment(1);
        Ok(todo)
    }

    /// Apply a partial update to an existing todo.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] if a supplied `text` is blank
    /// - [`ServiceError::NotFound`] if no todo has this id
    /// - [`ServiceError::Store`] if the store fails
    #[tracing::instrument(skip(self, patch), fields(todo_id = %id))]
    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Todo, ServiceError> {
        let patch = patch.normalize()?;
        let todo = self.repository.update(id, patch).await?;
        tracing::info!(completed = todo.completed, "Todo updated");
        metrics::counter!("todo_service.operations.total", "operation" => "update").increment(1);
        Ok(todo)
    }

    /// Delete a todo.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if no todo has this id
    /// - [`ServiceError::Store`] if the store fails
    #[tracing::instrument(skip(self), fields(todo_id = %id))]
    pub async fn delete(&self, id: TodoId) -> Result<(), ServiceError> {
        self.repository.delete(id).await?;
        tracing::info!("Todo deleted");
        metrics::counter!("todo_service.operations.total", "operation" => "delete").increment(1);
        Ok(())
    }

    /// Whether the store currently answers.
    pub async fn is_ready(&self) -> bool {
        match self.repository.ping().await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "Store not ready");
                false
            },
        }
    }
}

impl std::fmt::Debug for TodoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoService").finish_non_exhaustive()
    }
}
