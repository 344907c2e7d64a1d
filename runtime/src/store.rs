//! The Store: state, reducer, environment and the effect feedback loop.

use crate::handle::{EffectHandle, InFlight};
use crate::StoreError;
use std::sync::Arc;
use std::time::Duration;
use todo_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast carrying effect-produced actions
const ACTION_BUFFER: usize = 16;

/// Runtime for one reducer
///
/// Reductions are serialised by a write lock on the state. Effects run as
/// spawned tasks; the action a future effect yields is broadcast to
/// subscribers and then sent back into the store.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    actions: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Store starting from `initial_state`
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            actions: broadcast::channel(ACTION_BUFFER).0,
        }
    }

    /// Reduce `action` and start its effects
    ///
    /// Returns once the state is updated and the effects are spawned. The
    /// handle waits for those effects, including the reduction of the
    /// actions they feed back.
    ///
    /// # Errors
    ///
    /// None today; the `Result` leaves room for a bounded store.
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        metrics::counter!("store.actions.total").increment(1);

        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };
        tracing::trace!(effects = effects.len(), "Reduced");

        let (handle, in_flight) = EffectHandle::new();
        for effect in effects {
            self.spawn_effect(effect, &in_flight);
        }
        Ok(handle)
    }

    /// Send `action`, then wait for an effect-produced action matching
    /// `predicate`
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: nothing matched within `timeout`
    /// - [`StoreError::ChannelClosed`]: the broadcast closed
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        // Subscribe first so a fast result is not missed
        let mut rx = self.actions.subscribe();
        self.send(action).await?;

        let matching = async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => break Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action subscriber lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => break Err(StoreError::ChannelClosed),
                }
            }
        };
        tokio::time::timeout(timeout, matching)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// Receive every action produced by an effect, before it is reduced
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.actions.subscribe()
    }

    /// Read the state through `f`
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&*self.state.read().await)
    }

    fn spawn_effect(&self, effect: Effect<A>, in_flight: &InFlight) {
        match effect {
            Effect::None => {},
            Effect::Parallel(effects) => {
                for effect in effects {
                    self.spawn_effect(effect, in_flight);
                }
            },
            Effect::Future(fut) => {
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                let guard = in_flight.start();
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = guard;
                    let Some(action) = fut.await else {
                        return;
                    };
                    // No subscribers is fine
                    let _ = store.actions.send(action.clone());
                    if let Err(error) = store.send(action).await {
                        tracing::warn!(%error, "Fed-back action was not reduced");
                    }
                });
            },
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            actions: self.actions.clone(),
        }
    }
}
