//! # Counter Example
//!
//! Two slices assembled into one store.
//!
//! This example showcases:
//! - Declaring slices with `#[derive(Action)]` and `#[derive(StatePaths)]`
//! - Assembling them into a store
//! - Wrapped actions (`counter.increment(5)`)
//! - Typed paths and dot-path reads over the same state
//!
//! ## Example
//!
//! ```no_run
//! use counter::{app_store, CounterActionDispatch, CounterSlice, CounterState};
//! use slicekit_runtime::StoreConfig;
//!
//! # fn example() -> Result<(), slicekit_runtime::StoreError> {
//! let store = app_store(StoreConfig::default())?;
//! let counter = store.slice::<CounterSlice>("counter")?;
//!
//! counter.increment(5)?;
//!
//! assert_eq!(counter.read(CounterState::count)?, 5);
//! assert_eq!(store.read_path("counter.count")?, serde_json::json!(5));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use slicekit_core::{ReducerError, Slice};
use slicekit_macros::{Action, StatePaths};
use slicekit_runtime::{Store, StoreBuilder, StoreConfig, StoreError};

/// Oldest age a profile may hold
pub const MAX_AGE: u32 = 150;

/// Counter state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, StatePaths)]
pub struct CounterState {
    /// Current count value
    pub count: i64,
}

/// Counter actions
#[derive(Action, Debug, Clone)]
pub enum CounterAction {
    /// Add to the counter
    Increment(i64),
    /// Subtract from the counter
    Decrement(i64),
    /// Reset the counter to 0
    Reset,
}

/// The `counter` slice
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterSlice;

impl Slice for CounterSlice {
    type State = CounterState;
    type Action = CounterAction;

    fn name(&self) -> &str {
        "counter"
    }

    fn initial_state(&self) -> CounterState {
        CounterState::default()
    }

    fn reduce(&self, state: &mut CounterState, action: CounterAction) -> Result<(), ReducerError> {
        let next = match action {
            CounterAction::Increment(by) => state.count.checked_add(by),
            CounterAction::Decrement(by) => state.count.checked_sub(by),
            CounterAction::Reset => Some(0),
        };
        state.count = next.ok_or_else(|| ReducerError::rejected("counter overflow"))?;
        Ok(())
    }
}

/// Public profile of a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, StatePaths)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Name shown to other users
    pub display_name: String,
    /// Age in years
    pub age: u32,
}

/// User state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, StatePaths)]
pub struct UserState {
    /// Login name
    pub name: String,
    /// Public profile
    pub profile: Profile,
    /// Free-form labels, in insertion order without duplicates
    pub tags: Vec<String>,
}

/// User actions
#[derive(Action, Debug, Clone)]
pub enum UserAction {
    /// Change the login name; the display name follows if it was unset
    Rename {
        /// New login name
        name: String,
    },
    /// Set the profile age
    SetAge(u32),
    /// Add a tag if not already present
    AddTag(String),
}

/// The `user` slice
#[derive(Debug, Clone, Copy, Default)]
pub struct UserSlice;

impl Slice for UserSlice {
    type State = UserState;
    type Action = UserAction;

    fn name(&self) -> &str {
        "user"
    }

    fn initial_state(&self) -> UserState {
        UserState::default()
    }

    fn reduce(&self, state: &mut UserState, action: UserAction) -> Result<(), ReducerError> {
        match action {
            UserAction::Rename { name } => {
                if name.trim().is_empty() {
                    return Err(ReducerError::rejected("name cannot be blank"));
                }
                if state.profile.display_name.is_empty() {
                    state.profile.display_name.clone_from(&name);
                }
                state.name = name;
            },
            UserAction::SetAge(age) => {
                if age > MAX_AGE {
                    return Err(ReducerError::rejected(format!(
                        "age {age} exceeds {MAX_AGE}"
                    )));
                }
                state.profile.age = age;
            },
            UserAction::AddTag(tag) => {
                if !state.tags.contains(&tag) {
                    state.tags.push(tag);
                }
            },
        }
        Ok(())
    }
}

/// Assemble the application store: `counter` and `user`.
///
/// # Errors
///
/// Never fails with the built-in slices; the `Result` mirrors
/// [`StoreBuilder::build`].
pub fn app_store(config: StoreConfig) -> Result<Store, StoreError> {
    StoreBuilder::new(config)
        .slice(CounterSlice)
        .slice(UserSlice)
        .build()
}
