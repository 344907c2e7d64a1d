//! Application state for Axum handlers.

use crate::service::TodoService;
use std::sync::Arc;
use todo_core::TodoRepository;

/// Application state shared across all HTTP handlers.
///
/// Holds only the service handle; all todo data lives in the repository.
#[derive(Clone, Debug)]
pub struct AppState {
    /// CRUD operations over the Entity Store
    pub todos: TodoService,
}

impl AppState {
    /// Create application state over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self {
            todos: TodoService::new(repository),
        }
    }
}
