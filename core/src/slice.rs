//! Slices: named units of state and the update functions that change them.

use crate::action::ActionKind;
use serde::Serialize;
use std::fmt::Debug;
use thiserror::Error;

/// Error returned by an update function.
///
/// The store hands it back to whoever dispatched the action; the slice's
/// state is left as it was before the action.
#[derive(Error, Debug)]
pub enum ReducerError {
    /// The update function refused the action.
    #[error("Action rejected: {0}")]
    Rejected(String),

    /// Any other failure inside the update function.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ReducerError {
    /// Shorthand for [`ReducerError::Rejected`].
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// A named unit of state plus its update functions.
///
/// # Example
///
/// ```
/// use slicekit_core::{ActionKind, ReducerError, Slice};
/// use serde::Serialize;
///
/// #[derive(Clone, Debug, Default, Serialize)]
/// struct CounterState { count: i64 }
///
/// #[derive(Debug)]
/// enum CounterAction { Increment(i64) }
///
/// impl ActionKind for CounterAction {
///     fn kind(&self) -> &'static str { "increment" }
///     fn kinds() -> &'static [&'static str] { &["increment"] }
/// }
///
/// struct CounterSlice;
///
/// impl Slice for CounterSlice {
///     type State = CounterState;
///     type Action = CounterAction;
///
///     fn name(&self) -> &str { "counter" }
///
///     fn initial_state(&self) -> CounterState { CounterState::default() }
///
///     fn reduce(&self, state: &mut CounterState, action: CounterAction) -> Result<(), ReducerError> {
///         match action {
///             CounterAction::Increment(by) => state.count += by,
///         }
///         Ok(())
///     }
/// }
///
/// let mut state = CounterSlice.initial_state();
/// CounterSlice.reduce(&mut state, CounterAction::Increment(5)).unwrap();
/// assert_eq!(state.count, 5);
/// ```
pub trait Slice: Send + Sync + 'static {
    /// The slice's state. Serialisable so it can be read by dot path.
    type State: Clone + Serialize + Send + Sync + 'static;

    /// One variant per update function.
    type Action: ActionKind + Debug + Send + 'static;

    /// The key this slice occupies in the aggregate state.
    fn name(&self) -> &str;

    /// State before any action has been applied.
    fn initial_state(&self) -> Self::State;

    /// Apply `action` to `state`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReducerError`] when the action cannot be applied. Changes
    /// already made to `state` are discarded by the store.
    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Result<(), ReducerError>;
}
