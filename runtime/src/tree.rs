//! The aggregate state tree.
//!
//! Each registered slice lives in a type-erased cell keyed by slice name.
//! Typed access goes through [`StateTree::get`]; dynamic access serialises
//! the addressed slice to JSON and walks the rest of the path.

use crate::error::StoreError;
use serde_json::{Map, Value};
use slicekit_core::action::{ActionKind, ActionType};
use slicekit_core::path::{self, Path, PathError};
use slicekit_core::slice::Slice;
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::time::Instant;

/// Type-erased slice plus its current state.
pub(crate) trait SliceCell: Send + Sync {
    fn name(&self) -> &str;

    fn state_any(&self) -> &dyn Any;

    fn action_type_id(&self) -> TypeId;

    fn kinds(&self) -> &'static [&'static str];

    fn snapshot(&self) -> Result<Value, serde_json::Error>;

    /// Run the reducer on a copy of the state and commit only on success.
    fn apply(
        &mut self,
        action_type: &ActionType,
        payload: Box<dyn Any + Send>,
    ) -> Result<(), StoreError>;
}

struct Cell<S: Slice> {
    slice: S,
    state: S::State,
}

impl<S: Slice> SliceCell for Cell<S> {
    fn name(&self) -> &str {
        self.slice.name()
    }

    fn state_any(&self) -> &dyn Any {
        &self.state
    }

    fn action_type_id(&self) -> TypeId {
        TypeId::of::<S::Action>()
    }

    fn kinds(&self) -> &'static [&'static str] {
        <S::Action as ActionKind>::kinds()
    }

    fn snapshot(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.state)
    }

    fn apply(
        &mut self,
        action_type: &ActionType,
        payload: Box<dyn Any + Send>,
    ) -> Result<(), StoreError> {
        let action = payload
            .downcast::<S::Action>()
            .map_err(|_| StoreError::PayloadMismatch {
                action_type: action_type.clone(),
                expected: std::any::type_name::<S::Action>(),
            })?;

        let mut next = self.state.clone();

        let start = Instant::now();
        let result = self.slice.reduce(&mut next, *action);
        crate::metrics::StoreMetrics::record_reducer(start.elapsed());

        result.map_err(|source| StoreError::Reducer {
            action_type: action_type.clone(),
            source,
        })?;

        self.state = next;
        Ok(())
    }
}

/// A slice ready to be registered with a store.
///
/// Built from any [`Slice`], optionally with a preloaded state instead of
/// the slice's initial state.
pub struct SliceEntry {
    cell: Box<dyn SliceCell>,
}

impl SliceEntry {
    /// Register `slice` with its initial state.
    #[must_use]
    pub fn new<S: Slice>(slice: S) -> Self {
        let state = slice.initial_state();
        Self::with_state(slice, state)
    }

    /// Register `slice` starting from `state`.
    #[must_use]
    pub fn with_state<S: Slice>(slice: S, state: S::State) -> Self {
        Self {
            cell: Box::new(Cell { slice, state }),
        }
    }

    /// The slice name this entry will occupy.
    #[must_use]
    pub fn name(&self) -> &str {
        self.cell.name()
    }
}

impl<S: Slice> From<S> for SliceEntry {
    fn from(slice: S) -> Self {
        Self::new(slice)
    }
}

impl std::fmt::Debug for SliceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceEntry").field("name", &self.name()).finish()
    }
}

/// The merged state of every slice, keyed by slice name.
#[derive(Default)]
pub struct StateTree {
    cells: BTreeMap<String, Box<dyn SliceCell>>,
}

impl StateTree {
    /// Add a slice. Its name must be a single path segment so that dot
    /// paths can reach it, and must not be taken.
    pub(crate) fn insert(&mut self, entry: SliceEntry) -> Result<(), StoreError> {
        let name = entry.name().to_string();
        if name.is_empty() || name.contains(path::SEPARATOR) {
            return Err(StoreError::InvalidSliceName(name));
        }
        if self.cells.contains_key(&name) {
            return Err(StoreError::DuplicateSliceName(name));
        }
        self.cells.insert(name, entry.cell);
        Ok(())
    }

    pub(crate) fn apply(
        &mut self,
        action_type: &ActionType,
        payload: Box<dyn Any + Send>,
    ) -> Result<(), StoreError> {
        let cell = self
            .cells
            .get_mut(action_type.slice())
            .ok_or_else(|| StoreError::SliceNotFound(action_type.slice().to_string()))?;
        cell.apply(action_type, payload)
    }

    /// Check that slice `name` exists and was registered as an `S`.
    pub(crate) fn check<S: Slice>(&self, name: &str) -> Result<(), StoreError> {
        let cell = self
            .cells
            .get(name)
            .ok_or_else(|| StoreError::SliceNotFound(name.to_string()))?;

        if cell.state_any().is::<S::State>() && cell.action_type_id() == TypeId::of::<S::Action>() {
            Ok(())
        } else {
            Err(StoreError::SliceTypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<S>(),
            })
        }
    }

    /// Typed state of slice `name`, if it exists and holds an `S::State`.
    #[must_use]
    pub fn get<S: Slice>(&self, name: &str) -> Option<&S::State> {
        self.cells.get(name)?.state_any().downcast_ref::<S::State>()
    }

    /// Whether a slice called `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Registered slice names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Number of slices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no slices are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every `"<slice>/<kind>"` action type the tree accepts.
    #[must_use]
    pub fn action_types(&self) -> Vec<ActionType> {
        self.cells
            .iter()
            .flat_map(|(name, cell)| {
                cell.kinds()
                    .iter()
                    .map(move |kind| ActionType::new(name.clone(), *kind))
            })
            .collect()
    }

    /// Serialise the whole tree as `{ slice_name: slice_state, ... }`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if a slice state fails to serialise.
    pub fn to_value(&self) -> Result<Value, StoreError> {
        let mut members = Map::new();
        for (name, cell) in &self.cells {
            members.insert(name.clone(), cell.snapshot()?);
        }
        Ok(Value::Object(members))
    }

    /// Resolve a dot path, serialising only the slice the path starts in.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Path`] if any segment does not exist
    /// - [`StoreError::Serialization`] if the slice state fails to serialise
    pub fn resolve(&self, path: &Path) -> Result<Value, StoreError> {
        let head = path.head();
        let cell = self.cells.get(head).ok_or_else(|| PathError::NotFound {
            path: path.to_string(),
            segment: head.to_string(),
            depth: 0,
        })?;

        let slice_value = cell.snapshot()?;
        Ok(path::resolve_from(&slice_value, path, 1)?.clone())
    }
}

impl std::fmt::Debug for StateTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTree")
            .field("slices", &self.cells.keys().collect::<Vec<_>>())
            .finish()
    }
}
