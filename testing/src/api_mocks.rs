//! Scriptable [`TodoApi`] for client tests.
//!
//! [`MockTodoApi`] behaves like a healthy service backed by an in-memory
//! list, records every call it receives and can be switched into a failing
//! mode to exercise error paths.

use crate::mocks::stepping_clock;
use std::sync::{Arc, Mutex, MutexGuard};
use todo_core::api::ApiFuture;
use todo_core::environment::Clock;
use todo_core::{ApiError, NewTodo, Todo, TodoApi, TodoId, TodoPatch};

/// One recorded call against [`MockTodoApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `list()`
    List,
    /// `create(text)`
    Create {
        /// Text as sent by the client
        text: String,
    },
    /// `update(id, patch)`
    Update {
        /// Target id
        id: TodoId,
        /// Patch as sent by the client
        patch: TodoPatch,
    },
    /// `delete(id)`
    Delete {
        /// Target id
        id: TodoId,
    },
}

#[derive(Debug, Default)]
struct MockState {
    todos: Vec<Todo>,
    calls: Vec<ApiCall>,
    failing: bool,
}

/// In-memory stand-in for the remote CRUD service.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the client environment owns another.
#[derive(Clone)]
pub struct MockTodoApi {
    state: Arc<Mutex<MockState>>,
    clock: Arc<dyn Clock>,
}

impl MockTodoApi {
    /// Empty, healthy service
    #[must_use]
    pub fn new() -> Self {
        Self::with_todos(Vec::new())
    }

    /// Healthy service already holding `todos` (in list order)
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                todos,
                ..MockState::default()
            })),
            clock: Arc::new(stepping_clock()),
        }
    }

    /// Make every subsequent call fail (`true`) or succeed (`false`)
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Every call received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of calls received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Current server-side list
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record `call` and report whether it should fail
    fn record(&self, call: ApiCall) -> Result<MutexGuard<'_, MockState>, ApiError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(state)
    }

    fn not_found() -> ApiError {
        ApiError::Status {
            status: 404,
            message: "Todo not found".to_string(),
        }
    }
}

impl Default for MockTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTodoApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTodoApi")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl TodoApi for MockTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        let result = self.record(ApiCall::List).map(|state| state.todos.clone());
        Box::pin(async move { result })
    }

    fn create(&self, text: String) -> ApiFuture<'_, Todo> {
        let result = self
            .record(ApiCall::Create { text: text.clone() })
            .and_then(|mut state| {
                let new = NewTodo::new(&text, false).map_err(|e| ApiError::Status {
                    status: 400,
                    message: e.to_string(),
                })?;
                let todo = Todo::create(TodoId::new(), new, self.clock.now());
                state.todos.insert(0, todo.clone());
                Ok(todo)
            });
        Box::pin(async move { result })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo> {
        let result = self
            .record(ApiCall::Update {
                id,
                patch: patch.clone(),
            })
            .and_then(|mut state| {
                let todo = state
                    .todos
                    .iter_mut()
                    .find(|todo| todo.id == id)
                    .ok_or_else(Self::not_found)?;
                todo.apply(&patch, self.clock.now());
                Ok(todo.clone())
            });
        Box::pin(async move { result })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        let result = self.record(ApiCall::Delete { id }).and_then(|mut state| {
            let before = state.todos.len();
            state.todos.retain(|todo| todo.id != id);
            if state.todos.len() == before {
                return Err(Self::not_found());
            }
            Ok(())
        });
        Box::pin(async move { result })
    }
}
