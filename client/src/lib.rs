//! Terminal client for Composable Todo.
//!
//! The client keeps a local mirror of the todo list and changes it only
//! after the CRUD service confirms an operation.
//!
//! - [`state`]: the list state and its reducer (Client State Manager)
//! - [`api`]: `TodoApi` over HTTP
//! - [`view`]: rendering of the state (Presentation Layer)
//! - [`intent`] and [`app`]: prompt commands and the loop driving the store
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use todo_client::{HttpTodoApi, TodoApp};
//!
//! let mut app = TodoApp::new(Arc::new(HttpTodoApi::new("http://localhost:5000/api")));
//! app.load().await?;
//! println!("{}", app.screen().await);
//! ```

pub mod api;
pub mod app;
pub mod cli;
pub mod intent;
pub mod state;
pub mod view;

pub use api::{DEFAULT_API_URL, HttpTodoApi};
pub use app::{CommandError, Flow, TodoApp};
pub use cli::Cli;
pub use intent::{Intent, ParseIntentError};
pub use state::{ClientEnvironment, TodoListAction, TodoListReducer, TodoListState};
pub use view::{EditMode, Screen, render};
