//! Derived values that follow the store.

use crate::error::StoreError;
use crate::store::{Store, WeakStore};
use crate::tree::StateTree;
use serde_json::Value;
use slicekit_core::path::Path;
use slicekit_core::selector::Selector;
use slicekit_core::slice::Slice;
use std::marker::PhantomData;
use tokio::sync::watch;

/// Selects the value at a dynamic path of the state tree.
///
/// Yields `None` when the path does not resolve; use
/// [`Store::read_path`] to learn why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSelector(pub Path);

impl PathSelector {
    /// Parse `raw` into a selector.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Path`] if `raw` is not a valid path.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        Ok(Self(Path::parse(raw)?))
    }
}

impl Selector<StateTree> for PathSelector {
    type Output = Option<Value>;

    fn select(&self, tree: &StateTree) -> Self::Output {
        tree.resolve(&self.0).ok()
    }
}

/// Applies a slice-state selector to one named slice of the tree.
///
/// Yields `None` while the slice is missing or has another type.
pub struct Scoped<S: Slice, Sel> {
    name: String,
    selector: Sel,
    _slice: PhantomData<fn() -> S>,
}

impl<S: Slice, Sel> Scoped<S, Sel> {
    /// Scope `selector` to slice `name`.
    pub fn new(name: impl Into<String>, selector: Sel) -> Self {
        Self {
            name: name.into(),
            selector,
            _slice: PhantomData,
        }
    }
}

impl<S: Slice, Sel: Selector<S::State>> Selector<StateTree> for Scoped<S, Sel> {
    type Output = Option<Sel::Output>;

    fn select(&self, tree: &StateTree) -> Self::Output {
        tree.get::<S>(&self.name).map(|state| self.selector.select(state))
    }
}

/// A value derived from the store, kept current on request.
///
/// Each refresh re-runs the selector against the latest state; the value
/// only counts as changed when it compares unequal to the previous one.
///
/// A selection holds the store weakly. Once every [`Store`] handle is
/// dropped the value stops updating and [`Selection::changed`] returns
/// [`StoreError::ChannelClosed`].
///
/// # Example
///
/// ```ignore
/// let mut count = store.watch(|tree: &StateTree| {
///     tree.get::<CounterSlice>("counter").map(|c| c.count)
/// });
///
/// tokio::spawn(async move {
///     while let Ok(value) = count.changed().await {
///         println!("count is now {value:?}");
///     }
/// });
/// ```
pub struct Selection<Sel: Selector<StateTree>> {
    store: WeakStore,
    selector: Sel,
    current: Sel::Output,
    rx: watch::Receiver<u64>,
}

impl<Sel> Selection<Sel>
where
    Sel: Selector<StateTree>,
    Sel::Output: PartialEq,
{
    pub(crate) fn new(store: &Store, selector: Sel) -> Self {
        // Subscribe before the first read so no change is missed.
        let mut rx = store.changes();
        rx.borrow_and_update();
        let current = store.read_with(&selector);
        Self {
            store: store.downgrade(),
            selector,
            current,
            rx,
        }
    }

    /// The last derived value.
    pub const fn get(&self) -> &Sel::Output {
        &self.current
    }

    /// Take the last derived value.
    pub fn into_inner(self) -> Sel::Output {
        self.current
    }

    /// Re-derive the value now. Returns `true` if it changed.
    ///
    /// Always `false` once the store is gone.
    pub fn refresh(&mut self) -> bool {
        self.rx.borrow_and_update();
        let Some(store) = self.store.upgrade() else {
            return false;
        };
        let next = store.read_with(&self.selector);
        if next == self.current {
            false
        } else {
            self.current = next;
            true
        }
    }

    /// Wait until the derived value differs from the current one.
    ///
    /// Store changes that leave the value equal are absorbed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ChannelClosed`] once every [`Store`] handle is
    /// dropped, including while waiting.
    pub async fn changed(&mut self) -> Result<&Sel::Output, StoreError> {
        loop {
            self.rx
                .changed()
                .await
                .map_err(|_| StoreError::ChannelClosed)?;
            if self.refresh() {
                return Ok(&self.current);
            }
        }
    }
}

impl<Sel> std::fmt::Debug for Selection<Sel>
where
    Sel: Selector<StateTree>,
    Sel::Output: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
