//! In-memory Entity Store implementations.
//!
//! - [`InMemoryTodoRepository`]: HashMap-backed store with insertion ordering
//! - [`FailingTodoRepository`]: Store that reports every operation as unavailable

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use todo_core::environment::Clock;
use todo_core::repository::RepositoryFuture;
use todo_core::{NewTodo, RepositoryError, Todo, TodoId, TodoPatch, TodoRepository};

#[derive(Debug, Default)]
struct Records {
    next_seq: u64,
    by_id: HashMap<TodoId, (u64, Todo)>,
}

/// In-memory todo repository.
///
/// Cloning shares the underlying records.
#[derive(Clone)]
pub struct InMemoryTodoRepository {
    records: Arc<RwLock<Records>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTodoRepository {
    /// Create an empty repository timestamping with `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(RwLock::new(Records::default())),
            clock,
        }
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map_or(0, |records| records.by_id.len())
    }

    /// True when nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_poisoned() -> RepositoryError {
        RepositoryError::Database("in-memory store lock poisoned".to_string())
    }
}

impl std::fmt::Debug for InMemoryTodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTodoRepository")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn insert(&self, todo: NewTodo) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move {
            let mut records = self.records.write().map_err(|_| Self::lock_poisoned())?;
            let todo = Todo::create(TodoId::new(), todo, self.clock.now());
            let seq = records.next_seq;
            records.next_seq += 1;
            records.by_id.insert(todo.id, (seq, todo.clone()));
            tracing::debug!(todo_id = %todo.id, "Todo inserted");
            Ok(todo)
        })
    }

    fn find_all(&self) -> RepositoryFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            let records = self.records.read().map_err(|_| Self::lock_poisoned())?;
            let mut entries: Vec<&(u64, Todo)> = records.by_id.values().collect();
            entries.sort_by(|(a_seq, a), (b_seq, b)| {
                b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
            });
            Ok(entries.into_iter().map(|(_, todo)| todo.clone()).collect())
        })
    }

    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(async move {
            let records = self.records.read().map_err(|_| Self::lock_poisoned())?;
            Ok(records.by_id.get(&id).map(|(_, todo)| todo.clone()))
        })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move {
            let mut records = self.records.write().map_err(|_| Self::lock_poisoned())?;
            let (_, todo) = records
                .by_id
                .get_mut(&id)
                .ok_or(RepositoryError::NotFound(id))?;
            todo.apply(&patch, self.clock.now());
            Ok(todo.clone())
        })
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            let mut records = self.records.write().map_err(|_| Self::lock_poisoned())?;
            records
                .by_id
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound(id))
        })
    }

    fn ping(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Repository whose every operation fails with a database error.
#[derive(Debug, Clone)]
pub struct FailingTodoRepository {
    reason: String,
}

impl FailingTodoRepository {
    /// Fail every call with `reason`
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T: Send + 'static>(&self) -> RepositoryFuture<'_, T> {
        let error = RepositoryError::Database(self.reason.clone());
        Box::pin(async move { Err(error) })
    }
}

impl TodoRepository for FailingTodoRepository {
    fn insert(&self, _todo: NewTodo) -> RepositoryFuture<'_, Todo> {
        self.fail()
    }

    fn find_all(&self) -> RepositoryFuture<'_, Vec<Todo>> {
        self.fail()
    }

    fn find_by_id(&self, _id: TodoId) -> RepositoryFuture<'_, Option<Todo>> {
        self.fail()
    }

    fn update(&self, _id: TodoId, _patch: TodoPatch) -> RepositoryFuture<'_, Todo> {
        self.fail()
    }

    fn delete(&self, _id: TodoId) -> RepositoryFuture<'_, ()> {
        self.fail()
    }

    fn ping(&self) -> RepositoryFuture<'_, ()> {
        self.fail()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mocks::{stepping_clock, test_clock};

    fn repository() -> InMemoryTodoRepository {
        InMemoryTodoRepository::new(Arc::new(stepping_clock()))
    }

    fn new_todo(text: &str) -> NewTodo {
        NewTodo::new(text, false).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let repo = repository();

        let todo = repo.insert(new_todo("buy milk")).await.unwrap();

        assert_eq!(todo.text, "buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
        assert_eq!(repo.find_by_id(todo.id).await.unwrap(), Some(todo));
    }

    #[tokio::test]
    async fn find_all_is_newest_first() {
        let repo = repository();
        let t1 = repo.insert(new_todo("one")).await.unwrap();
        let t2 = repo.insert(new_todo("two")).await.unwrap();
        let t3 = repo.insert(new_todo("three")).await.unwrap();

        let ids: Vec<TodoId> = repo.find_all().await.unwrap().into_iter().map(|t| t.id).collect();

        assert_eq!(ids, vec![t3.id, t2.id, t1.id]);
    }

    #[tokio::test]
    async fn find_all_breaks_timestamp_ties_by_insertion() {
        let repo = InMemoryTodoRepository::new(Arc::new(test_clock()));
        let first = repo.insert(new_todo("first")).await.unwrap();
        let second = repo.insert(new_todo("second")).await.unwrap();

        let all = repo.find_all().await.unwrap();

        assert_eq!(all, vec![second, first]);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let repo = repository();
        let todo = repo.insert(new_todo("buy milk")).await.unwrap();

        let updated = repo.update(todo.id, TodoPatch::completed(true)).await.unwrap();

        assert!(updated.completed);
        assert_eq!(updated.text, todo.text);
        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at > todo.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_id_creates_nothing() {
        let repo = repository();

        let result = repo.update(TodoId::new(), TodoPatch::completed(true)).await;

        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let repo = repository();
        let todo = repo.insert(new_todo("buy milk")).await.unwrap();

        repo.delete(todo.id).await.unwrap();
        let second = repo.delete(todo.id).await;

        assert!(matches!(second, Err(RepositoryError::NotFound(id)) if id == todo.id));
    }

    #[tokio::test]
    async fn failing_repository_fails_everything() {
        let repo = FailingTodoRepository::new("connection refused");

        assert!(matches!(repo.find_all().await, Err(RepositoryError::Database(_))));
        assert!(matches!(repo.ping().await, Err(RepositoryError::Database(_))));
        assert!(matches!(
            repo.insert(new_todo("x")).await,
            Err(RepositoryError::Database(_))
        ));
    }
}
