//! HTTP CRUD service for Composable Todo.
//!
//! This crate is the imperative shell around the todo Entity Store: it turns
//! HTTP requests into validated [`TodoService`] calls and maps the outcome
//! back to JSON responses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, CORS
//! │  - Request parsing (ValidatedJson)      │  ← Correlation IDs
//! │  - Response / error mapping (AppError)  │  ← Tracing
//! ├─────────────────────────────────────────┤
//! │         TodoService                     │  ← Validation, no state
//! ├─────────────────────────────────────────┤
//! │         TodoRepository                  │  ← Postgres or in-memory
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use todo_web::{AppState, build_router};
//!
//! let repository = todo_web::connect_repository(&config.database).await?;
//! let app = build_router(AppState::new(repository));
//! axum::serve(listener, app).await?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod state;

use anyhow::Context as _;
use std::sync::Arc;
use todo_core::TodoRepository;
use todo_core::environment::SystemClock;
use todo_postgres::PostgresTodoRepository;
use todo_testing::InMemoryTodoRepository;

// Re-export key types for convenience
pub use config::{Config, DatabaseConfig};
pub use error::AppError;
pub use extractors::{CorrelationId, TodoIdParam, ValidatedJson};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use service::{ServiceError, TodoService};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

/// Open the configured Entity Store.
///
/// `memory` selects a process-local store; anything else is treated as a
/// `PostgreSQL` URL, connected to and migrated.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or migrated.
pub async fn connect_repository(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn TodoRepository>> {
    if config.is_in_memory() {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        return Ok(Arc::new(InMemoryTodoRepository::new(Arc::new(SystemClock))));
    }

    let repository =
        PostgresTodoRepository::connect(&config.url, config.max_connections, Arc::new(SystemClock))
            .await
            .context("Failed to connect to PostgreSQL")?;
    repository
        .migrate()
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(max_connections = config.max_connections, "Connected to PostgreSQL");

    Ok(Arc::new(repository))
}
