//! Interactive shell around the todo list store.
//!
//! [`TodoApp`] owns the [`Store`] and the local [`EditMode`], turns an
//! [`Intent`] into store actions and waits for the service to answer before
//! the next screen is rendered.

use crate::intent::Intent;
use crate::state::{ClientEnvironment, TodoListAction, TodoListReducer, TodoListState};
use crate::view::{EditError, EditMode, Screen, render};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use todo_core::{TodoApi, TodoId};
use todo_runtime::{Store, StoreError};
use tokio::sync::broadcast;

/// How long a single command may wait for the service
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Store specialised to the todo list
pub type TodoStore = Store<TodoListState, TodoListAction, ClientEnvironment, TodoListReducer>;

/// Command that could not be carried out locally
///
/// Failures of the service itself are not errors here: they land in the
/// error banner of [`TodoListState`].
#[derive(Debug, Error)]
pub enum CommandError {
    /// No row with that number is shown
    #[error("No todo at row {0}")]
    NoSuchRow(usize),
    /// Edit mode refused
    #[error(transparent)]
    Edit(#[from] EditError),
    /// `draft`, `save` or `cancel` outside edit mode
    #[error("Not editing a todo")]
    NotEditing,
    /// Saving a blank draft
    #[error("Text cannot be empty")]
    BlankText,
    /// The store did not settle in time
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the prompt loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands
    Continue,
    /// Stop
    Quit,
}

/// The terminal todo application
pub struct TodoApp {
    store: TodoStore,
    edit: EditMode,
    timeout: Duration,
}

impl TodoApp {
    /// App backed by `api`. The list starts out loading; call [`Self::load`].
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        let initial = TodoListState {
            loading: true,
            ..TodoListState::default()
        };
        Self {
            store: Store::new(initial, TodoListReducer::new(), ClientEnvironment::new(api)),
            edit: EditMode::Viewing,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different per-command timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the list from the service
    ///
    /// # Errors
    ///
    /// [`CommandError::Store`] if the service does not answer in time.
    pub async fn load(&mut self) -> Result<(), CommandError> {
        self.send(TodoListAction::Refresh).await
    }

    /// Current screen
    pub async fn screen(&self) -> Screen {
        self.store.state(|state| render(state, &self.edit)).await
    }

    /// Snapshot of the list state
    pub async fn state(&self) -> TodoListState {
        self.store.state(Clone::clone).await
    }

    /// Local edit mode
    #[must_use]
    pub const fn edit_mode(&self) -> &EditMode {
        &self.edit
    }

    /// Carry out one prompt command
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the command makes no sense for the
    /// current screen or the service does not answer in time.
    pub async fn dispatch(&mut self, intent: Intent) -> Result<Flow, CommandError> {
        tracing::debug!(?intent, "Dispatching");

        match intent {
            Intent::Add(text) => self.send(TodoListAction::Add { text }).await?,
            Intent::Toggle(row) => {
                let id = self.row_id(row).await?;
                self.send(TodoListAction::ToggleComplete { id }).await?;
            },
            Intent::Delete(row) => {
                let id = self.row_id(row).await?;
                self.send(TodoListAction::Remove { id }).await?;
            },
            Intent::StartEdit(row) => {
                let id = self.row_id(row).await?;
                let state = self.state().await;
                self.edit.start(&state, id)?;
            },
            Intent::UpdateDraft(text) => {
                if !self.edit.update_draft(text) {
                    return Err(CommandError::NotEditing);
                }
            },
            Intent::SaveEdit => self.save_edit().await?,
            Intent::CancelEdit => {
                if self.edit.editing().is_none() {
                    return Err(CommandError::NotEditing);
                }
                self.edit.cancel();
            },
            Intent::Refresh => self.send(TodoListAction::Refresh).await?,
            Intent::DismissError => self.send(TodoListAction::DismissError).await?,
            Intent::Quit => return Ok(Flow::Quit),
        }

        self.reconcile_edit().await;
        Ok(Flow::Continue)
    }

    async fn send(&self, action: TodoListAction) -> Result<(), CommandError> {
        let mut handle = self.store.send(action).await?;
        handle.wait_with_timeout(self.timeout).await?;
        Ok(())
    }

    /// Id behind a visible row. No rows are shown while loading.
    async fn row_id(&self, row: usize) -> Result<TodoId, CommandError> {
        self.store
            .state(|state| {
                if state.loading {
                    return None;
                }
                row.checked_sub(1).and_then(|i| state.todos.get(i)).map(|t| t.id)
            })
            .await
            .ok_or(CommandError::NoSuchRow(row))
    }

    /// Save the draft. Edit mode is left only if the service accepted it;
    /// on failure the draft stays so it can be retried.
    async fn save_edit(&mut self) -> Result<(), CommandError> {
        let EditMode::Editing { id, draft } = self.edit.clone() else {
            return Err(CommandError::NotEditing);
        };
        if draft.trim().is_empty() {
            return Err(CommandError::BlankText);
        }

        let mut results = self.store.subscribe_actions();
        self.send(TodoListAction::EditText { id, text: draft }).await?;

        loop {
            match results.try_recv() {
                Ok(TodoListAction::TextEdited { todo }) if todo.id == id => {
                    self.edit.cancel();
                    break;
                },
                Ok(TodoListAction::UpdateFailed { id: failed, .. }) if failed == id => break,
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {},
                Err(_) => break,
            }
        }
        Ok(())
    }

    /// Leave edit mode when the edited todo is gone or was completed
    async fn reconcile_edit(&mut self) {
        let Some(id) = self.edit.editing() else {
            return;
        };
        let editable = self
            .store
            .state(|state| state.get(id).is_some_and(|todo| !todo.completed))
            .await;
        if !editable {
            self.edit.cancel();
        }
    }
}

impl std::fmt::Debug for TodoApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoApp")
            .field("edit", &self.edit)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
