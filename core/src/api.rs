//! Client-side contract for the CRUD service.
//!
//! The client state manager only ever talks to the service through
//! [`TodoApi`], so reducers can be exercised against a mock and the binary
//! against the HTTP implementation.

use crate::todo::{Todo, TodoId, TodoPatch};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by API calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Any failed remote call.
///
/// The client does not distinguish causes in its UI contract; the variants
/// exist for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("Service responded with {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// `message` from the error body, if any
        message: String,
    },

    /// The request never got a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// The four CRUD operations as seen from the client.
pub trait TodoApi: Send + Sync {
    /// All todos, newest first.
    ///
    /// # Errors
    ///
    /// Any failed call.
    fn list(&self) -> ApiFuture<'_, Vec<Todo>>;

    /// Create a not-yet-completed todo.
    ///
    /// # Errors
    ///
    /// Any failed call.
    fn create(&self, text: String) -> ApiFuture<'_, Todo>;

    /// Apply a partial update, returning the full updated record.
    ///
    /// # Errors
    ///
    /// Any failed call.
    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo>;

    /// Delete a todo.
    ///
    /// # Errors
    ///
    /// Any failed call.
    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()>;
}
