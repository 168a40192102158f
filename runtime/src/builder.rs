//! Store assembly.

use crate::error::StoreError;
use crate::middleware::{LoggingMiddleware, Middleware};
use crate::store::Store;
use crate::tree::{SliceEntry, StateTree};
use crate::StoreConfig;
use slicekit_core::slice::Slice;
use std::sync::Arc;

/// Collects slices and middleware, then builds a [`Store`].
///
/// Slice names are checked when [`StoreBuilder::build`] runs; the first
/// duplicate or unaddressable name fails the whole build.
///
/// # Example
///
/// ```ignore
/// let store = StoreBuilder::new(StoreConfig::default().with_log_actions(true))
///     .slice(CounterSlice)
///     .slice_with_state(UserSlice, saved_user)
///     .middleware(AuditMiddleware::default())
///     .build()?;
/// ```
#[must_use = "a builder does nothing until `build` is called"]
pub struct StoreBuilder {
    config: StoreConfig,
    entries: Vec<SliceEntry>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl StoreBuilder {
    /// Start an empty builder.
    pub const fn new(config: StoreConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Register `slice` with its initial state.
    pub fn slice<S: Slice>(self, slice: S) -> Self {
        self.entry(SliceEntry::new(slice))
    }

    /// Register `slice` starting from `state`.
    pub fn slice_with_state<S: Slice>(self, slice: S, state: S::State) -> Self {
        self.entry(SliceEntry::with_state(slice, state))
    }

    /// Register a prepared entry.
    pub fn entry(mut self, entry: SliceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Append `middleware` to the chain.
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Build the store.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateSliceName`]: two entries share a name
    /// - [`StoreError::InvalidSliceName`]: a name is empty or contains `.`
    #[tracing::instrument(skip(self), fields(store = %self.config.name, slices = self.entries.len()))]
    pub fn build(self) -> Result<Store, StoreError> {
        let Self {
            config,
            entries,
            mut middleware,
        } = self;

        let mut tree = StateTree::default();
        for entry in entries {
            let name = entry.name().to_string();
            if let Err(error) = tree.insert(entry) {
                tracing::warn!(slice = %name, error = %error, "Slice rejected");
                return Err(error);
            }
            tracing::trace!(slice = %name, "Registered slice");
        }

        if config.log_actions {
            middleware.insert(0, Arc::new(LoggingMiddleware));
        }

        tracing::debug!(
            slices = tree.len(),
            middleware = middleware.len(),
            "Store assembled"
        );

        Ok(Store::from_parts(config, tree, middleware))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl std::fmt::Debug for StoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBuilder")
            .field("config", &self.config)
            .field("entries", &self.entries)
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
