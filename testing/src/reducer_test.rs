//! Ergonomic testing utilities for reducers
//!
//! A fluent Given-When-Then API. `run()` checks one reducer call in isolation;
//! `run_with_feedback()` additionally executes the returned effects and feeds
//! every produced action back into the reducer, the way the store would.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use crate::effects::run_to_completion;
use todolists_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Type alias for produced-action assertion functions
type ActionAssertion<A> = Box<dyn FnOnce(&[A])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// use todolists_testing::ReducerTest;
///
/// ReducerTest::new(TodolistsReducer::new())
///     .with_env(environment)
///     .given_state(RootState::default())
///     .given_actions(vec![todolist_added("X")])
///     .when_action(todolist_removed("X"))
///     .then_state(|state| {
///         assert!(state.todolists.is_empty());
///         assert!(state.tasks.is_empty());
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    setup_actions: Vec<A>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
    action_assertions: Vec<ActionAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    A: Clone + Send + 'static,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            setup_actions: Vec::new(),
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
            action_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Actions reduced before the action under test (Given)
    ///
    /// Their effects are dropped without being executed.
    #[must_use]
    pub fn given_actions(mut self, actions: Vec<A>) -> Self {
        self.setup_actions.extend(actions);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects returned for the action under test (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the actions produced by effects (Then)
    ///
    /// Only checked by [`ReducerTest::run_with_feedback`].
    #[must_use]
    pub fn then_actions<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[A]) + 'static,
    {
        self.action_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test without executing effects
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set, if action
    /// assertions were registered, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(mut self) {
        assert!(
            self.action_assertions.is_empty(),
            "then_actions() requires run_with_feedback()"
        );

        let (mut state, action, env) = self.prepare();
        let effects = self.reducer.reduce(&mut state, action, &env);

        for assertion in self.state_assertions {
            assertion(&state);
        }
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }

    /// Run the test, executing effects and reducing every produced action
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set, or if any
    /// assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub async fn run_with_feedback(mut self) {
        let (mut state, action, env) = self.prepare();
        let effects = self.reducer.reduce(&mut state, action, &env);

        for assertion in self.effect_assertions {
            assertion(&effects);
        }

        let produced = run_to_completion(&self.reducer, &mut state, &env, effects).await;

        for assertion in self.state_assertions {
            assertion(&state);
        }
        for assertion in self.action_assertions {
            assertion(&produced);
        }
    }

    #[allow(clippy::expect_used)] // Test code can use expect
    fn prepare(&mut self) -> (S, A, E) {
        let mut state = self
            .initial_state
            .take()
            .expect("Initial state must be set with given_state()");
        let action = self.action.take().expect("Action must be set with when_action()");
        let env = self
            .environment
            .take()
            .expect("Environment must be set with with_env()");

        for setup in std::mem::take(&mut self.setup_actions) {
            let _ = self.reducer.reduce(&mut state, setup, &env);
        }

        (state, action, env)
    }
}

/// Helper assertions for effects
pub mod assertions {
    use todolists_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect would do work when executed.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todolists_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct TestState {
        items: Vec<u32>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Push(u32),
        PushLater(u32),
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Push(n) => {
                    state.items.push(n);
                    smallvec![Effect::None]
                },
                TestAction::PushLater(n) => {
                    smallvec![Effect::future(async move { Some(TestAction::Push(n)) })]
                },
            }
        }
    }

    #[test]
    fn given_actions_are_applied_first() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState::default())
            .given_actions(vec![TestAction::Push(1), TestAction::Push(2)])
            .when_action(TestAction::Push(3))
            .then_state(|state| assert_eq!(state.items, vec![1, 2, 3]))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn run_does_not_execute_effects() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState::default())
            .when_action(TestAction::PushLater(7))
            .then_state(|state| assert!(state.items.is_empty()))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[tokio::test]
    async fn run_with_feedback_reduces_produced_actions() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState::default())
            .when_action(TestAction::PushLater(7))
            .then_state(|state| assert_eq!(state.items, vec![7]))
            .then_actions(|actions| assert_eq!(actions, [TestAction::Push(7)]))
            .run_with_feedback()
            .await;
    }
}
