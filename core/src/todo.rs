//! Domain types for the todo list.
//!
//! A [`Todo`] is the only entity. Records are created from a validated
//! [`NewTodo`] and mutated through a [`TodoPatch`] whose allow-list is exactly
//! `text` and `completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a new random `TodoId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TodoId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A persisted todo item, as returned by the service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier, assigned by the store
    pub id: TodoId,
    /// What needs doing
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
    /// When the todo was last modified
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Materializes a new record from validated input.
    #[must_use]
    pub fn create(id: TodoId, new: NewTodo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text: new.text,
            completed: new.completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the fields present in `patch` and refreshes `updated_at`.
    ///
    /// `id` and `created_at` are never touched.
    pub fn apply(&mut self, patch: &TodoPatch, now: DateTime<Utc>) {
        if let Some(text) = &patch.text {
            self.text.clone_from(text);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now;
    }
}

/// Validation failures for todo input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `text` was absent or blank
    #[error("Text is required")]
    MissingText,
}

/// Validated input for creating a todo.
///
/// Can only be built from non-blank text, so an empty record never reaches a
/// repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    text: String,
    completed: bool,
}

impl NewTodo {
    /// Validates and normalizes creation input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingText`] if `text` is blank.
    pub fn new(text: &str, completed: bool) -> Result<Self, ValidationError> {
        let text = normalize_text(text)?;
        Ok(Self { text, completed })
    }

    /// The trimmed text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The initial completion flag
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }
}

/// Request body for creating a todo: `{text, completed?}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTodoRequest {
    /// Required, non-blank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Defaults to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl CreateTodoRequest {
    /// Request for a new, not yet completed todo.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: Some(false),
        }
    }

    /// Checks the body against the creation rules.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingText`] if `text` is absent or blank.
    pub fn validate(self) -> Result<NewTodo, ValidationError> {
        let text = self.text.ok_or(ValidationError::MissingText)?;
        NewTodo::new(&text, self.completed.unwrap_or(false))
    }
}

/// Partial update: any subset of `{text, completed}`.
///
/// Unknown fields (including `id`, `createdAt`, `updatedAt`) are rejected at
/// deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoPatch {
    /// Replacement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Replacement completion flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that only sets `completed`
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    /// Patch that only replaces `text`
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }

    /// True when no field would change
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }

    /// Trims a supplied `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingText`] if a supplied `text` is blank.
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let text = self.text.as_deref().map(normalize_text).transpose()?;
        Ok(Self {
            text,
            completed: self.completed,
        })
    }
}

fn normalize_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingText);
    }
    Ok(trimmed.to_string())
}
