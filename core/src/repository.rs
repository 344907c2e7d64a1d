//! Repository trait for todo persistence.
//!
//! The repository is the Entity Store: it exclusively owns persisted
//! [`Todo`] records, assigns identifiers and maintains timestamps.
//!
//! # Implementations
//!
//! - `PostgresTodoRepository` (in `todo-postgres`): Production implementation
//! - `InMemoryTodoRepository` (in `todo-testing`): Fast, deterministic testing
//!
//! # Dyn Compatibility
//!
//! Methods return explicit `Pin<Box<dyn Future>>` values instead of using
//! `async fn` so the repository can be shared as `Arc<dyn TodoRepository>`.

use crate::todo::{NewTodo, Todo, TodoId, TodoPatch};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by repository operations.
pub type RepositoryFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Errors that can occur during repository operations.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No record with this id exists.
    #[error("Todo {0} not found")]
    NotFound(TodoId),

    /// Connectivity or internal store failure.
    #[error("Database error: {0}")]
    Database(String),
}

/// Durable keyed storage of todo records.
pub trait TodoRepository: Send + Sync {
    /// Persist a new record, assigning its id and timestamps.
    ///
    /// # Errors
    ///
    /// - `Database`: Store unavailable or write failed
    fn insert(&self, todo: NewTodo) -> RepositoryFuture<'_, Todo>;

    /// All records, newest `created_at` first.
    ///
    /// Records sharing a creation time are returned newest insertion first.
    ///
    /// # Errors
    ///
    /// - `Database`: Store unavailable or read failed
    fn find_all(&self) -> RepositoryFuture<'_, Vec<Todo>>;

    /// Look up a single record.
    ///
    /// # Errors
    ///
    /// - `Database`: Store unavailable or read failed
    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>>;

    /// Merge `patch` into an existing record and refresh `updated_at`.
    ///
    /// Never creates a record.
    ///
    /// # Errors
    ///
    /// - `NotFound`: No record with this id
    /// - `Database`: Store unavailable or write failed
    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<'_, Todo>;

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// - `NotFound`: No record with this id
    /// - `Database`: Store unavailable or write failed
    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, ()>;

    /// Cheap connectivity check.
    ///
    /// # Errors
    ///
    /// - `Database`: Store unavailable
    fn ping(&self) -> RepositoryFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error_display() {
        let id = TodoId::new();
        let display = format!("{}", RepositoryError::NotFound(id));
        assert!(display.contains(&id.to_string()));
        assert!(display.contains("not found"));
    }

    #[test]
    fn database_error_display() {
        let display = format!("{}", RepositoryError::Database("connection refused".into()));
        assert_eq!(display, "Database error: connection refused");
    }
}
