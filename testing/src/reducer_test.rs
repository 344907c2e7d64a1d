//! Given/When/Then harness for reducers.
//!
//! A [`ReducerTest`] reduces one or more actions against a starting state,
//! checks the resulting state and the effects of the last action, and can
//! hand those effects back so [`resolve_effects`] can run them without a
//! Store.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use todo_core::{SmallVec, effect::Effect, reducer::Reducer};

type Effects<A> = SmallVec<[Effect<A>; 4]>;
type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Reducer test case
///
/// # Example
///
/// ```ignore
/// use todo_testing::ReducerTest;
///
/// ReducerTest::new(TodoListReducer::new())
///     .with_env(test_environment())
///     .given_state(TodoListState::default())
///     .when_action(TodoListAction::Refresh)
///     .then_state(|state| assert!(state.loading))
///     .then_effects(|effects| assert_eq!(effects.len(), 1))
///     .run();
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    env: Option<R::Environment>,
    state: Option<R::State>,
    actions: Vec<R::Action>,
    state_checks: Vec<StateCheck<R::State>>,
    effect_checks: Vec<EffectCheck<R::Action>>,
}

impl<R: Reducer> ReducerTest<R> {
    /// Start a test case for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            state: None,
            actions: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Environment passed to every reduction
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Starting state (Given)
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Action to reduce (When). Repeated calls reduce actions in order.
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Check the final state (Then)
    #[must_use]
    pub fn then_state(mut self, check: impl FnOnce(&R::State) + 'static) -> Self {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check the effects returned for the last action (Then)
    #[must_use]
    pub fn then_effects(mut self, check: impl FnOnce(&[Effect<R::Action>]) + 'static) -> Self {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Reduce and run every check
    ///
    /// # Panics
    ///
    /// Panics if the state, environment or action was not given, or if a
    /// check fails.
    pub fn run(self) {
        drop(self.run_with_effects());
    }

    /// Reduce, run every check and return the last action's effects
    ///
    /// # Panics
    ///
    /// Panics if the state, environment or action was not given, or if a
    /// check fails.
    #[allow(clippy::expect_used)] // Misuse of the harness is a test bug
    pub fn run_with_effects(self) -> Effects<R::Action> {
        let mut state = self.state.expect("given_state() was not called");
        let env = self.env.expect("with_env() was not called");
        assert!(!self.actions.is_empty(), "when_action() was not called");

        let mut effects = SmallVec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env);
        }

        for check in self.state_checks {
            check(&state);
        }
        for check in self.effect_checks {
            check(&effects);
        }
        effects
    }
}

/// Run effects one after another and collect the actions they feed back
///
/// `Parallel` effects are flattened in order.
pub async fn resolve_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut queue: std::collections::VecDeque<Effect<A>> = effects.into_iter().collect();
    let mut fed_back = Vec::new();

    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::None => {},
            Effect::Parallel(inner) => {
                for effect in inner.into_iter().rev() {
                    queue.push_front(effect);
                }
            },
            Effect::Future(fut) => fed_back.extend(fut.await),
        }
    }
    fed_back
}

/// Effect checks usable with [`ReducerTest::then_effects`]
pub mod assertions {
    use todo_core::effect::Effect;

    fn futures<A>(effects: &[Effect<A>]) -> usize {
        effects
            .iter()
            .map(|effect| match effect {
                Effect::None => 0,
                Effect::Future(_) => 1,
                Effect::Parallel(inner) => futures(inner),
            })
            .sum()
    }

    /// Nothing to execute: no effects, or only `Effect::None`
    ///
    /// # Panics
    ///
    /// Panics if any effect would do work.
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert_eq!(futures(effects), 0, "expected no work, got {effects:?}");
    }

    /// Exactly `expected` top-level effects
    ///
    /// # Panics
    ///
    /// Panics on a different count.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected number of effects");
    }

    /// At least one future, possibly nested in `Parallel`
    ///
    /// # Panics
    ///
    /// Panics if no effect would do work.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(futures(effects) > 0, "expected a future effect, found none");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::smallvec;

    /// Tracks a draft and how many times it was saved.
    #[derive(Debug, Default)]
    struct Draft {
        text: String,
        saves: u32,
    }

    #[derive(Debug, PartialEq, Eq)]
    enum DraftAction {
        Type(char),
        Clear,
        Save,
        Saved,
    }

    struct DraftReducer;

    impl Reducer for DraftReducer {
        type State = Draft;
        type Action = DraftAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Draft,
            action: DraftAction,
            _env: &(),
        ) -> SmallVec<[Effect<DraftAction>; 4]> {
            match action {
                DraftAction::Type(c) => {
                    state.text.push(c);
                    SmallVec::new()
                },
                DraftAction::Clear => {
                    state.text.clear();
                    smallvec![Effect::None]
                },
                DraftAction::Save => smallvec![Effect::merge(vec![
                    Effect::future(async { Some(DraftAction::Saved) }),
                    Effect::future(async { None }),
                    Effect::merge(vec![Effect::future(async { Some(DraftAction::Clear) })]),
                ])],
                DraftAction::Saved => {
                    state.saves += 1;
                    SmallVec::new()
                },
            }
        }
    }

    #[test]
    fn actions_are_reduced_in_order() {
        ReducerTest::new(DraftReducer)
            .with_env(())
            .given_state(Draft::default())
            .when_action(DraftAction::Type('o'))
            .when_action(DraftAction::Type('k'))
            .then_state(|draft| assert_eq!(draft.text, "ok"))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn none_counts_as_no_work() {
        ReducerTest::new(DraftReducer)
            .with_env(())
            .given_state(Draft {
                text: "x".to_string(),
                saves: 0,
            })
            .when_action(DraftAction::Clear)
            .then_state(|draft| assert!(draft.text.is_empty()))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[tokio::test]
    async fn nested_parallel_effects_resolve_in_order() {
        let effects = ReducerTest::new(DraftReducer)
            .with_env(())
            .given_state(Draft::default())
            .when_action(DraftAction::Save)
            .then_state(|draft| assert_eq!(draft.saves, 0))
            .then_effects(assertions::assert_has_future_effect)
            .run_with_effects();

        assert_eq!(
            resolve_effects(effects).await,
            vec![DraftAction::Saved, DraftAction::Clear]
        );
    }
}
