//! `PostgreSQL` todo repository for Composable Todo.
//!
//! This crate provides the production implementation of the `TodoRepository`
//! trait from `todo-core`. It uses sqlx with:
//!
//! - Connection pooling
//! - Embedded migrations (`migrations/`)
//! - Timestamps taken from an injected `Clock`
//!
//! # Example
//!
//! ```ignore
//! use todo_postgres::PostgresTodoRepository;
//! use todo_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repository = PostgresTodoRepository::connect(
//!         "postgres://localhost/todo_app",
//!         10,
//!         Arc::new(SystemClock),
//!     )
//!     .await?;
//!     repository.migrate().await?;
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::sync::Arc;
use todo_core::environment::Clock;
use todo_core::repository::RepositoryFuture;
use todo_core::{NewTodo, RepositoryError, Todo, TodoId, TodoPatch, TodoRepository};
use uuid::Uuid;

const TODO_COLUMNS: &str = "id, text, completed, created_at, updated_at";

/// `PostgreSQL`-backed todo repository.
#[derive(Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresTodoRepository {
    /// Create a repository over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Connect to `database_url` with at most `max_connections` pooled connections.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the connection cannot be established.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to connect: {e}")))?;

        Ok(Self::new(pool, clock))
    }

    /// Run database migrations.
    ///
    /// Creates the `todos` table if it doesn't already exist.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if migration fails.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_todo(row: &PgRow) -> Result<Todo, RepositoryError> {
        let id: Uuid = row.try_get("id").map_err(database_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(database_error)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(database_error)?;

        Ok(Todo {
            id: TodoId::from_uuid(id),
            text: row.try_get("text").map_err(database_error)?,
            completed: row.try_get("completed").map_err(database_error)?,
            created_at,
            updated_at,
        })
    }
}

impl std::fmt::Debug for PostgresTodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTodoRepository")
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

#[allow(clippy::needless_pass_by_value)] // Used as a `map_err` callback
fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(error.to_string())
}

impl TodoRepository for PostgresTodoRepository {
    fn insert(&self, todo: NewTodo) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move {
            let now = self.clock.now();
            let row = sqlx::query(&format!(
                "INSERT INTO todos (id, text, completed, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $4)
                 RETURNING {TODO_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(todo.text())
            .bind(todo.completed())
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

            let todo = Self::row_to_todo(&row)?;
            tracing::debug!(todo_id = %todo.id, "Todo inserted");
            metrics::counter!("todo_store.writes.total", "operation" => "insert").increment(1);
            Ok(todo)
        })
    }

    fn find_all(&self) -> RepositoryFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            let rows = sqlx::query(&format!(
                "SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, seq DESC"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

            rows.iter().map(Self::row_to_todo).collect()
        })
    }

    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(async move {
            let row = sqlx::query(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

            row.as_ref().map(Self::row_to_todo).transpose()
        })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move {
            // Absent fields bind NULL and keep their stored value
            let row = sqlx::query(&format!(
                "UPDATE todos
                 SET text = COALESCE($2, text),
                     completed = COALESCE($3, completed),
                     updated_at = $4
                 WHERE id = $1
                 RETURNING {TODO_COLUMNS}"
            ))
            .bind(id.as_uuid())
            .bind(patch.text.as_deref())
            .bind(patch.completed)
            .bind(self.clock.now())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound(id))?;

            metrics::counter!("todo_store.writes.total", "operation" => "update").increment(1);
            Self::row_to_todo(&row)
        })
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM todos WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound(id));
            }

            metrics::counter!("todo_store.writes.total", "operation" => "delete").increment(1);
            Ok(())
        })
    }

    fn ping(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
            Ok(())
        })
    }
}
