//! # Slicekit Core
//!
//! Core traits and types for slice-based state stores.
//!
//! This crate defines the vocabulary shared by the runtime, the derive macros
//! and application code. It performs no I/O and holds no state of its own.
//!
//! ## Core Concepts
//!
//! - **Slice**: a named unit of state plus its update functions ([`Slice`])
//! - **Action**: one variant per update function, tagged `"<slice>/<kind>"` ([`Action`])
//! - **Dispatch**: anything that accepts actions ([`Dispatch`])
//! - **Path**: a dot-delimited location in the state tree ([`Path`], [`KeyPath`])
//! - **Selector**: anything that derives a value from state ([`Selector`])
//!
//! ## Example
//!
//! ```ignore
//! use slicekit_core::{ReducerError, Slice};
//! use slicekit_macros::{Action, StatePaths};
//!
//! #[derive(Clone, Debug, Default, Serialize, StatePaths)]
//! struct CounterState { count: i64 }
//!
//! #[derive(Action, Debug)]
//! enum CounterAction { Increment(i64), Reset }
//!
//! struct CounterSlice;
//!
//! impl Slice for CounterSlice {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!
//!     fn name(&self) -> &str { "counter" }
//!     fn initial_state(&self) -> CounterState { CounterState::default() }
//!
//!     fn reduce(&self, state: &mut CounterState, action: CounterAction) -> Result<(), ReducerError> {
//!         match action {
//!             CounterAction::Increment(by) => state.count += by,
//!             CounterAction::Reset => state.count = 0,
//!         }
//!         Ok(())
//!     }
//! }
//! ```

pub mod action;
pub mod path;
pub mod selector;
pub mod slice;

pub use action::{Action, ActionKind, ActionType, Dispatch};
pub use path::{Field, KeyPath, Path, PathError, lookup, resolve};
pub use selector::Selector;
pub use serde_json::Value;
pub use slice::{ReducerError, Slice};
