//! Typed access to one slice of a store.

use crate::error::StoreError;
use crate::selection::{Scoped, Selection};
use crate::store::{Dispatched, Store};
use serde_json::Value;
use slicekit_core::action::{Action, Dispatch};
use slicekit_core::path::Path;
use slicekit_core::selector::Selector;
use slicekit_core::slice::Slice;
use std::marker::PhantomData;

/// A typed view of slice `S` inside a [`Store`].
///
/// Obtained from [`Store::slice`]. Dispatching through a handle tags the
/// action with the slice's name, and the `<Enum>Dispatch` traits generated by
/// `#[derive(Action)]` turn each action variant into a method on it:
///
/// ```ignore
/// let counter = store.slice::<CounterSlice>("counter")?;
/// counter.increment(5)?;          // same as counter.dispatch(CounterAction::Increment(5))
/// counter.reset()?;
/// ```
pub struct SliceHandle<S: Slice> {
    store: Store,
    name: String,
    _slice: PhantomData<fn() -> S>,
}

impl<S: Slice> SliceHandle<S> {
    pub(crate) fn new(store: Store, name: &str) -> Self {
        Self {
            store,
            name: name.to_string(),
            _slice: PhantomData,
        }
    }

    /// The slice name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The store this handle belongs to.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// A copy of the slice state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SliceNotFound`] if the slice is gone, which
    /// cannot happen for a handle obtained from [`Store::slice`].
    pub fn state(&self) -> Result<S::State, StoreError> {
        self.read(|state: &S::State| state.clone())
    }

    /// Derive a value from the slice state.
    ///
    /// Accepts closures and typed paths generated by `#[derive(StatePaths)]`.
    ///
    /// # Errors
    ///
    /// See [`SliceHandle::state`].
    pub fn read<Sel: Selector<S::State>>(&self, selector: Sel) -> Result<Sel::Output, StoreError> {
        self.store
            .read(Scoped::<S, _>::new(self.name.as_str(), selector))
            .ok_or_else(|| StoreError::SliceNotFound(self.name.clone()))
    }

    /// Read a dot path relative to this slice, e.g. `"profile.age"`.
    ///
    /// # Errors
    ///
    /// See [`Store::read_path`].
    pub fn read_path(&self, path: &str) -> Result<Value, StoreError> {
        let absolute = Path::parse(&self.name)?.join(path)?;
        self.store.resolve(&absolute)
    }

    /// Track a value derived from the slice state.
    ///
    /// The selection yields `None` if the slice is missing.
    pub fn watch<Sel>(&self, selector: Sel) -> Selection<Scoped<S, Sel>>
    where
        Sel: Selector<S::State>,
        Sel::Output: PartialEq,
    {
        self.store.watch(Scoped::new(self.name.as_str(), selector))
    }
}

impl<S: Slice> Dispatch<S::Action> for SliceHandle<S> {
    type Output = Result<Dispatched, StoreError>;

    fn dispatch(&self, action: S::Action) -> Self::Output {
        self.store.dispatch(Action::new(self.name.as_str(), action))
    }
}

impl<S: Slice> Clone for SliceHandle<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name.clone(),
            _slice: PhantomData,
        }
    }
}

impl<S: Slice> std::fmt::Debug for SliceHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceHandle")
            .field("name", &self.name)
            .field("slice", &std::any::type_name::<S>())
            .finish()
    }
}
