//! # Todo Testing
//!
//! Testing utilities and helpers for Composable Todo.
//!
//! This crate provides:
//! - Deterministic clocks
//! - [`InMemoryTodoRepository`]: HashMap-backed Entity Store (also used by the
//!   server when no database is configured)
//! - [`FailingTodoRepository`]: Store that is always unavailable
//! - [`MockTodoApi`]: Scriptable client-side service with call recording
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```
//! use todo_testing::{InMemoryTodoRepository, test_clock};
//! use todo_core::{NewTodo, TodoRepository};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryTodoRepository::new(Arc::new(test_clock()));
//! let todo = repository.insert(NewTodo::new("buy milk", false)?).await?;
//! assert_eq!(repository.find_all().await?, vec![todo]);
//! # Ok(())
//! # }
//! ```

mod api_mocks;
mod reducer_test;
mod repository_mocks;

use chrono::{DateTime, Utc};
use todo_core::environment::Clock;

/// Deterministic clock implementations.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_testing::mocks::FixedClock;
    /// use todo_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every reading
    ///
    /// Gives strictly increasing timestamps, so ordering and
    /// "`updated_at` moved" assertions do not depend on wall-clock resolution.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: chrono::Duration,
    }

    impl SteppingClock {
        /// Start at `start`, advancing by `step` after each reading
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = match self.next.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(epoch())
    }

    /// A stepping clock starting at 2025-01-01 00:00:00 UTC, one second per reading
    #[must_use]
    pub fn stepping_clock() -> SteppingClock {
        SteppingClock::new(epoch(), chrono::Duration::seconds(1))
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }
}

// Re-export commonly used items
pub use api_mocks::{ApiCall, MockTodoApi};
pub use mocks::{FixedClock, SteppingClock, stepping_clock, test_clock};
pub use reducer_test::{ReducerTest, assertions, resolve_effects};
pub use repository_mocks::{FailingTodoRepository, InMemoryTodoRepository};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_stepping_clock_advances() {
        let clock = stepping_clock();
        let first = clock.now();
        let second = clock.now();
        assert_eq!(second - first, chrono::Duration::seconds(1));
    }
}
