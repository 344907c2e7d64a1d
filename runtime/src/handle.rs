//! Completion tracking for the effects of one `send`.

use crate::StoreError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Waits for the effects started by one [`Store::send`](crate::Store::send)
///
/// A future effect counts as done once the action it produced has been
/// reduced.
#[derive(Clone)]
pub struct EffectHandle {
    in_flight: watch::Receiver<usize>,
}

impl EffectHandle {
    pub(crate) fn new() -> (Self, InFlight) {
        let (tx, rx) = watch::channel(0);
        (Self { in_flight: rx }, InFlight(Arc::new(tx)))
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        Self::new().0
    }

    /// Effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until no effect is running
    pub async fn wait(&mut self) {
        // Err means every tracker is gone, so nothing can still be running.
        let _ = self.in_flight.wait_for(|running| *running == 0).await;
    }

    /// [`wait`](Self::wait), bounded by `timeout`
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] if effects are still running when it expires.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Counter side of an [`EffectHandle`]
#[derive(Clone)]
pub(crate) struct InFlight(Arc<watch::Sender<usize>>);

impl InFlight {
    /// Count one more running effect until the guard is dropped
    pub(crate) fn start(&self) -> InFlightGuard {
        self.0.send_modify(|running| *running += 1);
        InFlightGuard(self.clone())
    }
}

/// Decrements on drop, so a panicking effect still completes the handle
pub(crate) struct InFlightGuard(InFlight);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.0.send_modify(|running| *running = running.saturating_sub(1));
    }
}
