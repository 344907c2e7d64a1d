//! Presentation layer.
//!
//! [`render`] turns the client state plus the local [`EditMode`] into a
//! [`Screen`], a plain description of what the terminal shows. Rendering
//! never talks to the service; user input is turned into actions by
//! [`crate::intent`] and [`crate::app`].

use crate::state::TodoListState;
use std::fmt;
use todo_core::{Todo, TodoId};

/// Heading of the screen
pub const TITLE: &str = "Todo App";
/// Shown when the list is empty and nothing is loading
pub const EMPTY_MESSAGE: &str = "No todos yet. Add one above!";
/// Shown while a refresh is in flight
pub const LOADING_MESSAGE: &str = "Loading...";

/// Why an edit could not be started
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// No todo with that id is shown
    #[error("No such todo")]
    UnknownTodo,
    /// Completed todos cannot be edited
    #[error("Completed todos cannot be edited")]
    Completed,
}

/// Whether a row is being edited
///
/// At most one todo is in edit mode at a time. The draft lives here, not in
/// [`TodoListState`], until it is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditMode {
    /// Nothing is being edited
    #[default]
    Viewing,
    /// `id` is being edited with the current `draft` text
    Editing {
        /// The edited todo
        id: TodoId,
        /// Text typed so far
        draft: String,
    },
}

impl EditMode {
    /// Start editing `id`, seeding the draft with its current text
    ///
    /// Replaces any edit already in progress.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] if `id` is not in `state` or is completed.
    pub fn start(&mut self, state: &TodoListState, id: TodoId) -> Result<(), EditError> {
        let todo = state.get(id).ok_or(EditError::UnknownTodo)?;
        if todo.completed {
            return Err(EditError::Completed);
        }
        *self = Self::Editing {
            id,
            draft: todo.text.clone(),
        };
        Ok(())
    }

    /// Replace the draft text. Returns `false` when nothing is being edited.
    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        match self {
            Self::Editing { draft, .. } => {
                *draft = text.into();
                true
            },
            Self::Viewing => false,
        }
    }

    /// Leave edit mode, discarding the draft
    pub fn cancel(&mut self) {
        *self = Self::Viewing;
    }

    /// Id of the todo being edited
    #[must_use]
    pub const fn editing(&self) -> Option<TodoId> {
        match self {
            Self::Editing { id, .. } => Some(*id),
            Self::Viewing => None,
        }
    }
}

/// One rendered todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position, used to address the row from the prompt
    pub index: usize,
    /// The todo's id
    pub id: TodoId,
    /// Text shown (the draft while editing)
    pub text: String,
    /// Completion flag
    pub completed: bool,
    /// The row is in edit mode
    pub editing: bool,
    /// The edit control is available (not for completed todos)
    pub can_edit: bool,
}

impl Row {
    fn new(index: usize, todo: &Todo, edit: &EditMode) -> Self {
        let draft = match edit {
            EditMode::Editing { id, draft } if *id == todo.id => Some(draft.clone()),
            _ => None,
        };
        Self {
            index,
            id: todo.id,
            editing: draft.is_some(),
            text: draft.unwrap_or_else(|| todo.text.clone()),
            completed: todo.completed,
            can_edit: !todo.completed,
        }
    }
}

/// Main area of the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// A refresh is in flight
    Loading,
    /// Nothing to show
    Empty,
    /// The todos, in state order
    Rows(Vec<Row>),
}

/// Everything the terminal shows for one state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Heading
    pub title: &'static str,
    /// Error banner
    pub error: Option<String>,
    /// List area
    pub body: Body,
    /// `"{completed} completed / {total} total"`, present when there are todos
    pub summary: Option<String>,
}

/// Render `state` with the current edit mode
#[must_use]
pub fn render(state: &TodoListState, edit: &EditMode) -> Screen {
    let body = if state.loading {
        Body::Loading
    } else if state.todos.is_empty() {
        Body::Empty
    } else {
        Body::Rows(
            state
                .todos
                .iter()
                .enumerate()
                .map(|(i, todo)| Row::new(i + 1, todo, edit))
                .collect(),
        )
    };

    let summary = (!state.todos.is_empty()).then(|| {
        format!(
            "{} completed / {} total",
            state.completed_count(),
            state.count()
        )
    });

    Screen {
        title: TITLE,
        error: state.error.clone(),
        body,
        summary,
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.completed { 'x' } else { ' ' };
        write!(f, "{:>3}. [{mark}] {}", self.index, self.text)?;
        if self.editing {
            write!(f, "  (editing: save | cancel)")?;
        } else if !self.can_edit {
            write!(f, "  (done)")?;
        }
        Ok(())
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }
        match &self.body {
            Body::Loading => writeln!(f, "{LOADING_MESSAGE}")?,
            Body::Empty => writeln!(f, "{EMPTY_MESSAGE}")?,
            Body::Rows(rows) => {
                for row in rows {
                    writeln!(f, "{row}")?;
                }
            },
        }
        if let Some(summary) = &self.summary {
            writeln!(f, "{summary}")?;
        }
        Ok(())
    }
}
