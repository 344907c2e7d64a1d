//! Client-side mirror of the todo list.
//!
//! [`TodoListReducer`] is the Client State Manager: user commands start a
//! remote call (an `Effect::Future` against [`TodoApi`]), and the list is
//! only changed once the result action comes back. Nothing is applied
//! optimistically.

use std::sync::Arc;
use todo_core::{
    ApiError, SmallVec, Todo, TodoApi, TodoId, TodoPatch, effect::Effect, reducer::Reducer,
    smallvec,
};

/// Shown when listing fails.
pub const LOAD_ERROR: &str = "Failed to load todos. Please try again later.";
/// Shown when creating fails.
pub const ADD_ERROR: &str = "Failed to add todo. Please try again.";
/// Shown when deleting fails.
pub const DELETE_ERROR: &str = "Failed to delete todo. Please try again.";
/// Shown when toggling or editing fails.
pub const UPDATE_ERROR: &str = "Failed to update todo. Please try again.";

/// Local view of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoListState {
    /// Last list confirmed by the service, in display order
    pub todos: Vec<Todo>,
    /// A refresh is in flight
    pub loading: bool,
    /// Latest failure message, if any
    pub error: Option<String>,
}

impl TodoListState {
    /// Number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    /// Look up a todo by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    fn replace(&mut self, todo: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
            *slot = todo;
        }
    }
}

/// Actions for the todo list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoListAction {
    // Commands
    /// Reload the whole list
    Refresh,
    /// Create a todo with this text
    Add {
        /// Text as typed
        text: String,
    },
    /// Delete a todo
    Remove {
        /// Target
        id: TodoId,
    },
    /// Flip a todo's completion flag
    ToggleComplete {
        /// Target
        id: TodoId,
    },
    /// Replace a todo's text
    EditText {
        /// Target
        id: TodoId,
        /// New text
        text: String,
    },
    /// Clear the error message
    DismissError,

    // Results
    /// The list was fetched
    Loaded {
        /// Fresh list from the service
        todos: Vec<Todo>,
    },
    /// Fetching the list failed
    LoadFailed {
        /// Cause
        error: ApiError,
    },
    /// A todo was created
    Added {
        /// Record returned by the service
        todo: Todo,
    },
    /// Creating failed
    AddFailed {
        /// Cause
        error: ApiError,
    },
    /// A todo was deleted
    Removed {
        /// Deleted id
        id: TodoId,
    },
    /// Deleting failed
    RemoveFailed {
        /// Target
        id: TodoId,
        /// Cause
        error: ApiError,
    },
    /// A completion flag was flipped
    Toggled {
        /// Record returned by the service
        todo: Todo,
    },
    /// A text edit was saved
    TextEdited {
        /// Record returned by the service
        todo: Todo,
    },
    /// Toggling or editing failed
    UpdateFailed {
        /// Target
        id: TodoId,
        /// Cause
        error: ApiError,
    },
}

/// Dependencies of the todo list reducer
#[derive(Clone)]
pub struct ClientEnvironment {
    /// The remote CRUD service
    pub api: Arc<dyn TodoApi>,
}

impl ClientEnvironment {
    /// Environment talking to `api`
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self { api }
    }
}

impl std::fmt::Debug for ClientEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for [`TodoListState`]
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoListReducer;

impl TodoListReducer {
    /// Creates a new `TodoListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn update(
        env: &ClientEnvironment,
        id: TodoId,
        patch: TodoPatch,
        on_success: fn(Todo) -> TodoListAction,
    ) -> Effect<TodoListAction> {
        let api = Arc::clone(&env.api);
        Effect::future(async move {
            Some(match api.update(id, patch).await {
                Ok(todo) => on_success(todo),
                Err(error) => TodoListAction::UpdateFailed { id, error },
            })
        })
    }
}

impl Reducer for TodoListReducer {
    type State = TodoListState;
    type Action = TodoListAction;
    type Environment = ClientEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoListAction::Refresh => {
                state.loading = true;
                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    Some(match api.list().await {
                        Ok(todos) => TodoListAction::Loaded { todos },
                        Err(error) => TodoListAction::LoadFailed { error },
                    })
                })]
            },

            TodoListAction::Add { text } => {
                if text.trim().is_empty() {
                    return SmallVec::new();
                }
                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    Some(match api.create(text).await {
                        Ok(todo) => TodoListAction::Added { todo },
                        Err(error) => TodoListAction::AddFailed { error },
                    })
                })]
            },

            TodoListAction::Remove { id } => {
                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    Some(match api.delete(id).await {
                        Ok(()) => TodoListAction::Removed { id },
                        Err(error) => TodoListAction::RemoveFailed { id, error },
                    })
                })]
            },

            TodoListAction::ToggleComplete { id } => {
                let Some(todo) = state.get(id) else {
                    return SmallVec::new();
                };
                let patch = TodoPatch::completed(!todo.completed);
                smallvec![Self::update(env, id, patch, |todo| TodoListAction::Toggled { todo })]
            },

            TodoListAction::EditText { id, text } => {
                if text.trim().is_empty() {
                    return SmallVec::new();
                }
                let patch = TodoPatch::text(text);
                smallvec![Self::update(env, id, patch, |todo| TodoListAction::TextEdited { todo })]
            },

            TodoListAction::DismissError => {
                state.error = None;
                SmallVec::new()
            },

            TodoListAction::Loaded { todos } => {
                state.todos = todos;
                state.error = None;
                state.loading = false;
                SmallVec::new()
            },

            TodoListAction::LoadFailed { error } => {
                tracing::warn!(%error, "Failed to load todos");
                state.error = Some(LOAD_ERROR.to_string());
                state.loading = false;
                SmallVec::new()
            },

            TodoListAction::Added { todo } => {
                state.todos.push(todo);
                SmallVec::new()
            },

            TodoListAction::AddFailed { error } => {
                tracing::warn!(%error, "Failed to add todo");
                state.error = Some(ADD_ERROR.to_string());
                SmallVec::new()
            },

            TodoListAction::Removed { id } => {
                state.todos.retain(|todo| todo.id != id);
                SmallVec::new()
            },

            TodoListAction::RemoveFailed { id, error } => {
                tracing::warn!(%error, todo_id = %id, "Failed to delete todo");
                state.error = Some(DELETE_ERROR.to_string());
                SmallVec::new()
            },

            TodoListAction::Toggled { todo } | TodoListAction::TextEdited { todo } => {
                state.replace(todo);
                SmallVec::new()
            },

            TodoListAction::UpdateFailed { id, error } => {
                tracing::warn!(%error, todo_id = %id, "Failed to update todo");
                state.error = Some(UPDATE_ERROR.to_string());
                SmallVec::new()
            },
        }
    }
}
