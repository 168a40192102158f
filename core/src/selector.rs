//! Selectors: anything that derives a value from a state.
//!
//! Closures, typed paths and dynamic paths all implement [`Selector`], so a
//! single `read(selector)` entry point accepts each of them.

use crate::path::{resolve, Field, KeyPath, Path, PathError};
use serde_json::Value;

/// Derives a value from a state of type `S`.
pub trait Selector<S> {
    /// The derived value.
    type Output;

    /// Compute the value for `state`.
    fn select(&self, state: &S) -> Self::Output;
}

impl<S, T, F> Selector<S> for F
where
    F: Fn(&S) -> T,
{
    type Output = T;

    fn select(&self, state: &S) -> T {
        self(state)
    }
}

impl<S, T: Clone> Selector<S> for Field<S, T> {
    type Output = T;

    fn select(&self, state: &S) -> T {
        self.get(state).clone()
    }
}

impl<S: 'static, T: Clone + 'static> Selector<S> for KeyPath<S, T> {
    type Output = T;

    fn select(&self, state: &S) -> T {
        self.get(state).clone()
    }
}

impl Selector<Value> for Path {
    type Output = Result<Value, PathError>;

    fn select(&self, state: &Value) -> Self::Output {
        resolve(state, self).cloned()
    }
}
