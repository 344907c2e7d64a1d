//! # Todo Runtime
//!
//! Runs a [`Reducer`](todo_core::reducer::Reducer) against shared state and
//! executes the effects it returns.
//!
//! - [`Store`]: owns the state, reduces actions, spawns effects and feeds
//!   their actions back
//! - [`EffectHandle`]: waits until the effects started by one `send` are done
//!
//! ## Example
//!
//! ```ignore
//! use todo_runtime::Store;
//!
//! let store = Store::new(TodoListState::default(), TodoListReducer::new(), environment);
//!
//! let mut handle = store.send(TodoListAction::Refresh).await?;
//! handle.wait().await;
//!
//! let count = store.state(TodoListState::count).await;
//! ```

mod handle;
mod store;

pub use handle::EffectHandle;
pub use store::Store;

use thiserror::Error;

/// Errors returned by the [`Store`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Gave up waiting for effects or for a matching action
    #[error("Timed out waiting for the store")]
    Timeout,

    /// The action broadcast closed while waiting
    #[error("Action broadcast channel closed")]
    ChannelClosed,
}
