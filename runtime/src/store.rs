//! The Store: owner of the aggregate state tree and the only mutator of it.

use crate::error::StoreError;
use crate::handle::SliceHandle;
use crate::metrics::StoreMetrics;
use crate::middleware::{ActionRecord, DispatchOutcome, Middleware, MiddlewareDecision};
use crate::selection::Selection;
use crate::tree::StateTree;
use crate::{StoreBuilder, StoreConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;
use slicekit_core::action::{Action, ActionKind, ActionType};
use slicekit_core::path::Path;
use slicekit_core::selector::Selector;
use slicekit_core::slice::Slice;
use std::any::Any;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tokio::sync::{broadcast, watch};

/// Result of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Routing tag of the dispatched action.
    pub action_type: ActionType,
    /// Store version after the dispatch.
    pub version: u64,
    /// `false` when a middleware skipped the action.
    pub applied: bool,
}

/// Identifies a callback registered with [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&Dispatched) + Send + Sync>;

struct Inner {
    config: StoreConfig,
    tree: RwLock<StateTree>,
    middleware: Vec<Arc<dyn Middleware>>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
    version: watch::Sender<u64>,
    action_broadcast: broadcast::Sender<ActionRecord>,
}

/// The Store - owns the aggregate state tree
///
/// A store is built once per application with [`StoreBuilder`] (or
/// [`Store::assemble`]) and passed around explicitly. Cloning is cheap and
/// every clone shares the same state.
///
/// Reads and dispatches are synchronous. A dispatch holds the write lock
/// only while middleware `before` hooks and the reducer run; subscribers
/// are notified after it is released.
///
/// # Example
///
/// ```ignore
/// let store = Store::builder()
///     .slice(CounterSlice)
///     .slice(UserSlice)
///     .build()?;
///
/// let counter = store.slice::<CounterSlice>("counter")?;
/// counter.increment(5)?;
///
/// assert_eq!(store.read_path("counter.count")?, json!(5));
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

/// A handle that does not keep the store alive.
#[derive(Clone)]
pub(crate) struct WeakStore {
    inner: Weak<Inner>,
}

impl WeakStore {
    /// The store, unless every [`Store`] handle has been dropped.
    pub(crate) fn upgrade(&self) -> Option<Store> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl Store {
    /// Start building a store with the default configuration.
    #[must_use]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new(StoreConfig::default())
    }

    /// Assemble a store from `slices` with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`StoreBuilder::build`].
    pub fn assemble<I>(slices: I) -> Result<Self, StoreError>
    where
        I: IntoIterator,
        I::Item: Into<crate::SliceEntry>,
    {
        Self::assemble_with(StoreConfig::default(), slices)
    }

    /// Assemble a store from `slices` with `config`.
    ///
    /// # Errors
    ///
    /// See [`StoreBuilder::build`].
    pub fn assemble_with<I>(config: StoreConfig, slices: I) -> Result<Self, StoreError>
    where
        I: IntoIterator,
        I::Item: Into<crate::SliceEntry>,
    {
        slices
            .into_iter()
            .fold(StoreBuilder::new(config), |builder, entry| builder.entry(entry.into()))
            .build()
    }

    pub(crate) fn from_parts(
        config: StoreConfig,
        tree: StateTree,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        let (version, _) = watch::channel(0);
        let (action_broadcast, _) = broadcast::channel(config.action_broadcast_capacity.max(1));

        Self {
            inner: Arc::new(Inner {
                config,
                tree: RwLock::new(tree),
                middleware,
                subscribers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(0),
                version,
                action_broadcast,
            }),
        }
    }

    /// The configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub(crate) fn downgrade(&self) -> WeakStore {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Number of actions applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        *self.inner.version.borrow()
    }

    // A reducer runs on a copy of its slice state and the copy is committed
    // only on success, so a panic while the lock is held cannot leave the
    // tree half-updated. Poisoning is therefore safe to ignore.
    fn tree(&self) -> RwLockReadGuard<'_, StateTree> {
        self.inner.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn tree_mut(&self) -> RwLockWriteGuard<'_, StateTree> {
        self.inner.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit `action` to the slice named in its action type.
    ///
    /// Runs middleware, then the slice reducer. On success the store version
    /// advances, subscribers are notified and the action is broadcast.
    ///
    /// # Errors
    ///
    /// - [`StoreError::SliceNotFound`]: no slice has the targeted name
    /// - [`StoreError::PayloadMismatch`]: the payload is not that slice's action type
    /// - [`StoreError::Reducer`]: the reducer failed; state is unchanged
    #[tracing::instrument(skip_all, fields(action_type = %action.action_type), name = "store_dispatch")]
    pub fn dispatch<P>(&self, action: Action<P>) -> Result<Dispatched, StoreError>
    where
        P: ActionKind + Debug + Send + 'static,
    {
        let Action {
            action_type,
            payload,
        } = action;
        let record = ActionRecord::new(action_type, &payload);

        StoreMetrics::record_dispatch();
        let result = self.apply(&record, Box::new(payload));

        let outcome = match &result {
            Ok(dispatched) if dispatched.applied => DispatchOutcome::Applied {
                version: dispatched.version,
            },
            Ok(_) => DispatchOutcome::Skipped,
            Err(error) => DispatchOutcome::Failed(error),
        };
        for middleware in &self.inner.middleware {
            middleware.after(&record, &outcome);
        }

        match &result {
            Ok(dispatched) if dispatched.applied => {
                tracing::trace!(version = dispatched.version, "Action committed");
                self.notify(dispatched);
                // No receivers is fine.
                let _ = self.inner.action_broadcast.send(record);
            },
            Ok(_) => StoreMetrics::record_skip(),
            Err(error) => {
                tracing::warn!(error = %error, "Dispatch failed");
                StoreMetrics::record_failure();
            },
        }

        result
    }

    fn apply(
        &self,
        record: &ActionRecord,
        payload: Box<dyn Any + Send>,
    ) -> Result<Dispatched, StoreError> {
        let mut tree = self.tree_mut();
        tracing::trace!("Acquired write lock on state");

        for middleware in &self.inner.middleware {
            if middleware.before(record, &tree) == MiddlewareDecision::Skip {
                tracing::debug!(middleware = middleware.name(), "Action skipped by middleware");
                return Ok(Dispatched {
                    action_type: record.action_type.clone(),
                    version: self.version(),
                    applied: false,
                });
            }
        }

        tree.apply(&record.action_type, payload)?;

        self.inner.version.send_modify(|version| *version += 1);
        Ok(Dispatched {
            action_type: record.action_type.clone(),
            version: self.version(),
            applied: true,
        })
    }

    fn notify(&self, dispatched: &Dispatched) {
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();

        tracing::trace!("Notifying {} subscribers", subscribers.len());
        for subscriber in &subscribers {
            subscriber(dispatched);
        }
        StoreMetrics::record_notifications(subscribers.len());
    }

    /// Derive a value from the current state.
    ///
    /// `selector` may be any `Fn(&StateTree) -> T`, or a [`PathSelector`](crate::PathSelector).
    ///
    /// ```ignore
    /// let count = store.read(|tree: &StateTree| {
    ///     tree.get::<CounterSlice>("counter").map(|c| c.count)
    /// });
    /// ```
    pub fn read<Sel: Selector<StateTree>>(&self, selector: Sel) -> Sel::Output {
        self.read_with(&selector)
    }

    pub(crate) fn read_with<Sel: Selector<StateTree>>(&self, selector: &Sel) -> Sel::Output {
        selector.select(&self.tree())
    }

    /// Read the value at a dot path such as `"counter.count"`.
    ///
    /// The first segment names a slice; the rest walk that slice's
    /// serialised state.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Path`]: the path is malformed or does not exist
    /// - [`StoreError::Serialization`]: the slice state failed to serialise
    pub fn read_path(&self, path: &str) -> Result<Value, StoreError> {
        self.resolve(&Path::parse(path)?)
    }

    /// Read the value at an already-parsed path.
    ///
    /// # Errors
    ///
    /// See [`Store::read_path`].
    pub fn resolve(&self, path: &Path) -> Result<Value, StoreError> {
        self.tree().resolve(path)
    }

    /// Read the value at a dot path and deserialise it as `T`.
    ///
    /// # Errors
    ///
    /// See [`Store::read_path`]; also [`StoreError::Serialization`] when the
    /// value is not a `T`.
    pub fn read_path_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.read_path(path)?)?)
    }

    /// The whole aggregate state as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if a slice state fails to serialise.
    pub fn snapshot(&self) -> Result<Value, StoreError> {
        self.tree().to_value()
    }

    /// Registered slice names.
    #[must_use]
    pub fn slice_names(&self) -> Vec<String> {
        self.tree().names().map(str::to_string).collect()
    }

    /// Every action type the store accepts, as `"<slice>/<kind>"`.
    #[must_use]
    pub fn action_types(&self) -> Vec<ActionType> {
        self.tree().action_types()
    }

    /// A typed handle on slice `name`, for reads and wrapped actions.
    ///
    /// # Errors
    ///
    /// - [`StoreError::SliceNotFound`]: no slice called `name`
    /// - [`StoreError::SliceTypeMismatch`]: `name` was registered with another slice type
    pub fn slice<S: Slice>(&self, name: &str) -> Result<SliceHandle<S>, StoreError> {
        self.tree().check::<S>(name)?;
        Ok(SliceHandle::new(self.clone(), name))
    }

    /// Call `callback` after every applied action.
    ///
    /// The callback runs on the dispatching thread with no store lock held,
    /// so it may read from or dispatch to the store.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Dispatched) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// A receiver that observes the store version after every applied action.
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    /// A receiver for every applied action.
    ///
    /// Receivers that fall more than `action_broadcast_capacity` actions
    /// behind observe `RecvError::Lagged`.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<ActionRecord> {
        self.inner.action_broadcast.subscribe()
    }

    /// Track a derived value, re-deriving it as the state changes.
    ///
    /// The selection does not keep the store alive.
    pub fn watch<Sel>(&self, selector: Sel) -> Selection<Sel>
    where
        Sel: Selector<StateTree>,
        Sel::Output: PartialEq,
    {
        Selection::new(self, selector)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.config.name)
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}
