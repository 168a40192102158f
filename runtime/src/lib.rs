//! # Slicekit Runtime
//!
//! The store that assembles slices into one state tree and routes actions
//! to them.
//!
//! ## Core Components
//!
//! - **Store**: owns the aggregate state tree; the only thing that mutates it
//! - **`StoreBuilder`**: registers slices and middleware, rejects duplicate names
//! - **`SliceHandle`**: typed view of one slice; dispatches its wrapped actions
//! - **Selection**: a derived value that follows the state as it changes
//! - **Middleware**: hooks that observe or skip actions around dispatch
//!
//! ## Example
//!
//! ```ignore
//! use slicekit_runtime::Store;
//!
//! let store = Store::builder()
//!     .slice(CounterSlice)
//!     .slice(UserSlice)
//!     .build()?;
//!
//! // Wrapped action, generated by #[derive(Action)]
//! let counter = store.slice::<CounterSlice>("counter")?;
//! counter.increment(5)?;
//!
//! // Typed and dynamic reads see the same value
//! assert_eq!(counter.read(CounterState::count)?, 5);
//! assert_eq!(store.read_path("counter.count")?, json!(5));
//! ```

/// Dispatch and subscription metrics
pub mod metrics;

/// Middleware around dispatch
pub mod middleware;

mod builder;
mod handle;
mod selection;
mod store;
mod tree;

/// Error types for the Store runtime
pub mod error {
    use slicekit_core::action::ActionType;
    use slicekit_core::path::PathError;
    use slicekit_core::slice::ReducerError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Two slices were registered under the same name
        #[error("Duplicate slice name: {0}")]
        DuplicateSliceName(String),

        /// A slice name is empty or contains the path separator
        #[error("Invalid slice name: {0:?}")]
        InvalidSliceName(String),

        /// No slice is registered under this name
        #[error("Slice not found: {0}")]
        SliceNotFound(String),

        /// A slice exists under this name but has a different type
        #[error("Slice '{name}' is not a {expected}")]
        SliceTypeMismatch {
            /// Slice name
            name: String,
            /// Type that was asked for
            expected: &'static str,
        },

        /// The payload does not match the action type of the target slice
        #[error("Payload for {action_type} is not a {expected}")]
        PayloadMismatch {
            /// Routing tag of the rejected action
            action_type: ActionType,
            /// Action type the slice accepts
            expected: &'static str,
        },

        /// The slice reducer failed; state is unchanged
        #[error("Reducer failed for {action_type}: {source}")]
        Reducer {
            /// Routing tag of the failed action
            action_type: ActionType,
            /// Reducer error
            #[source]
            source: ReducerError,
        },

        /// A path was malformed or did not resolve
        #[error(transparent)]
        Path(#[from] PathError),

        /// Slice state could not be converted to or from JSON
        #[error("Serialization failed: {0}")]
        Serialization(#[from] serde_json::Error),

        /// The store was dropped while a selection was waiting for changes
        #[error("Store change channel closed")]
        ChannelClosed,
    }
}

pub use builder::StoreBuilder;
pub use error::StoreError;
pub use handle::SliceHandle;
pub use middleware::{ActionRecord, DispatchOutcome, LoggingMiddleware, Middleware, MiddlewareDecision};
pub use selection::{PathSelector, Scoped, Selection};
pub use store::{Dispatched, Store, SubscriptionId};
pub use tree::{SliceEntry, StateTree};

use serde::Deserialize;

/// Configuration for Store instances
///
/// Deserialises from any serde format; missing fields take their defaults.
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_name("app")
///     .with_action_broadcast_capacity(64)
///     .with_log_actions(true);
///
/// let store = StoreBuilder::new(config).slice(CounterSlice).build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name used in logs
    pub name: String,
    /// Buffer of the action broadcast channel
    pub action_broadcast_capacity: usize,
    /// Install [`LoggingMiddleware`] ahead of user middleware
    pub log_actions: bool,
}

impl StoreConfig {
    /// Set the store name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the action broadcast capacity (minimum 1)
    #[must_use]
    pub const fn with_action_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.action_broadcast_capacity = capacity;
        self
    }

    /// Enable or disable action logging
    #[must_use]
    pub const fn with_log_actions(mut self, enabled: bool) -> Self {
        self.log_actions = enabled;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "store".to_string(),
            action_broadcast_capacity: 16,
            log_actions: false,
        }
    }
}
