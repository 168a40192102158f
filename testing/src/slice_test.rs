//! Ergonomic testing utilities for slices
//!
//! This module provides a fluent API for testing slice reducers with readable
//! Given-When-Then syntax, without assembling a store.

#![allow(clippy::module_name_repetitions)] // SliceTest is the natural name

use slicekit_core::slice::{ReducerError, Slice};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for error assertion functions
type ErrorAssertion = Box<dyn FnOnce(&ReducerError)>;

/// Fluent API for testing slices with Given-When-Then syntax
///
/// Actions are applied in order with the same rule the store uses: a
/// reducer error leaves the state as it was before that action.
///
/// # Example
///
/// ```ignore
/// use slicekit_testing::SliceTest;
///
/// SliceTest::new(CounterSlice)
///     .given_state(CounterState { count: 1 })
///     .when_action(CounterAction::Increment(2))
///     .then_state(|state| {
///         assert_eq!(state.count, 3);
///     })
///     .run();
/// ```
pub struct SliceTest<S: Slice> {
    slice: S,
    initial_state: Option<S::State>,
    actions: Vec<S::Action>,
    state_assertions: Vec<StateAssertion<S::State>>,
    error_assertions: Vec<ErrorAssertion>,
}

impl<S: Slice> SliceTest<S> {
    /// Create a new slice test
    ///
    /// Without [`given_state`](Self::given_state) the slice's initial state is used.
    #[must_use]
    pub const fn new(slice: S) -> Self {
        Self {
            slice,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            error_assertions: Vec::new(),
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S::State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to apply (When)
    #[must_use]
    pub fn when_action(mut self, action: S::Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Add several actions to apply in order (When)
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = S::Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Expect a reducer error and add an assertion about the last one (Then)
    #[must_use]
    pub fn then_error<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&ReducerError) + 'static,
    {
        self.error_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if no action was set, if a reducer fails without a
    /// [`then_error`](Self::then_error) assertion, if one was set but no
    /// reducer failed, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    pub fn run(self) {
        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let mut state = self
            .initial_state
            .unwrap_or_else(|| self.slice.initial_state());
        let mut last_error = None;

        for action in self.actions {
            let mut next = state.clone();
            match self.slice.reduce(&mut next, action) {
                Ok(()) => state = next,
                Err(error) => last_error = Some(error),
            }
        }

        match (&last_error, self.error_assertions.is_empty()) {
            (Some(error), true) => panic!("Reducer for '{}' failed: {error}", self.slice.name()),
            (None, false) => panic!("Expected a reducer error but every action succeeded"),
            _ => {},
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        if let Some(error) = &last_error {
            for assertion in self.error_assertions {
                assertion(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicekit_core::action::ActionKind;

    #[derive(Debug, Clone, Default, serde::Serialize)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug)]
    enum TestAction {
        Increment,
        Decrement,
    }

    impl ActionKind for TestAction {
        fn kind(&self) -> &'static str {
            match self {
                Self::Increment => "increment",
                Self::Decrement => "decrement",
            }
        }

        fn kinds() -> &'static [&'static str] {
            &["increment", "decrement"]
        }
    }

    struct TestSlice;

    impl Slice for TestSlice {
        type State = TestState;
        type Action = TestAction;

        fn name(&self) -> &str {
            "test"
        }

        fn initial_state(&self) -> TestState {
            TestState::default()
        }

        fn reduce(&self, state: &mut TestState, action: TestAction) -> Result<(), ReducerError> {
            match action {
                TestAction::Increment => state.value += 1,
                TestAction::Decrement if state.value == 0 => {
                    return Err(ReducerError::rejected("value cannot go below zero"));
                },
                TestAction::Decrement => state.value -= 1,
            }
            Ok(())
        }
    }

    #[test]
    fn test_slice_test_api() {
        SliceTest::new(TestSlice)
            .given_state(TestState { value: 0 })
            .when_action(TestAction::Increment)
            .then_state(|state| {
                assert_eq!(state.value, 1);
            })
            .run();
    }

    #[test]
    fn test_defaults_to_initial_state() {
        SliceTest::new(TestSlice)
            .when_actions([TestAction::Increment, TestAction::Increment, TestAction::Decrement])
            .then_state(|state| assert_eq!(state.value, 1))
            .run();
    }

    #[test]
    fn test_error_keeps_previous_state() {
        SliceTest::new(TestSlice)
            .when_action(TestAction::Decrement)
            .then_state(|state| assert_eq!(state.value, 0))
            .then_error(|error| assert!(matches!(error, ReducerError::Rejected(_))))
            .run();
    }

    #[test]
    #[should_panic(expected = "Reducer for 'test' failed")]
    fn test_unexpected_error_panics() {
        SliceTest::new(TestSlice)
            .when_action(TestAction::Decrement)
            .run();
    }
}
