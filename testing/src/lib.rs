//! # Slicekit Testing
//!
//! Testing utilities and helpers for slicekit stores.
//!
//! This crate provides:
//! - [`SliceTest`], a Given-When-Then harness for slice reducers
//! - Mock middleware that records and optionally skips actions
//! - Tracing setup for tests
//! - proptest strategies for state trees and paths
//!
//! ## Example
//!
//! ```ignore
//! use slicekit_testing::mocks::RecordingMiddleware;
//!
//! #[test]
//! fn test_counter_flow() {
//!     let recorder = RecordingMiddleware::new();
//!     let store = Store::builder()
//!         .slice(CounterSlice)
//!         .middleware(recorder.clone())
//!         .build()
//!         .unwrap();
//!
//!     store.slice::<CounterSlice>("counter").unwrap().increment(5).unwrap();
//!
//!     assert_eq!(recorder.action_types(), vec!["counter/increment"]);
//! }
//! ```

/// Given-When-Then harness for slices
pub mod slice_test;

pub use slice_test::SliceTest;

/// Mock implementations for testing.
pub mod mocks {
    use slicekit_runtime::{ActionRecord, DispatchOutcome, Middleware, MiddlewareDecision, StateTree};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex, PoisonError};

    /// What a [`RecordingMiddleware`] saw for one action.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Recorded {
        /// Reducer ran; store moved to this version
        Applied(u64),
        /// Skipped by middleware
        Skipped,
        /// Dispatch failed with this message
        Failed(String),
    }

    /// Middleware that records every action and its outcome
    ///
    /// Clones share the same log, so keep one clone in the test and hand
    /// the other to the store builder.
    ///
    /// # Example
    ///
    /// ```
    /// use slicekit_testing::mocks::RecordingMiddleware;
    ///
    /// let recorder = RecordingMiddleware::new().skipping("reset");
    /// assert!(recorder.records().is_empty());
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct RecordingMiddleware {
        skip_kinds: HashSet<&'static str>,
        log: Arc<Mutex<Vec<(ActionRecord, Recorded)>>>,
    }

    impl RecordingMiddleware {
        /// Create a recorder that lets every action through
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Skip every action of this kind
        #[must_use]
        pub fn skipping(mut self, kind: &'static str) -> Self {
            self.skip_kinds.insert(kind);
            self
        }

        /// Everything recorded so far, in dispatch order
        #[must_use]
        pub fn records(&self) -> Vec<(ActionRecord, Recorded)> {
            self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// `"<slice>/<kind>"` of every recorded action
        #[must_use]
        pub fn action_types(&self) -> Vec<String> {
            self.records()
                .iter()
                .map(|(record, _)| record.action_type.to_string())
                .collect()
        }

        /// Forget everything recorded so far
        pub fn clear(&self) {
            self.log.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    impl Middleware for RecordingMiddleware {
        fn name(&self) -> &str {
            "recording"
        }

        fn before(&self, record: &ActionRecord, _state: &StateTree) -> MiddlewareDecision {
            if self.skip_kinds.contains(record.action_type.kind()) {
                MiddlewareDecision::Skip
            } else {
                MiddlewareDecision::Continue
            }
        }

        fn after(&self, record: &ActionRecord, outcome: &DispatchOutcome<'_>) {
            let recorded = match outcome {
                DispatchOutcome::Applied { version } => Recorded::Applied(*version),
                DispatchOutcome::Skipped => Recorded::Skipped,
                DispatchOutcome::Failed(error) => Recorded::Failed(error.to_string()),
            };
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((record.clone(), recorded));
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a `tracing` subscriber that writes to the test output
    ///
    /// Honours `RUST_LOG` and defaults to `debug` for slicekit crates. Safe to
    /// call from every test; only the first call installs anything.
    pub fn init_test_tracing() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("slicekit_runtime=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use serde_json::{Map, Value};
    use slicekit_core::path::Path;

    /// A path segment: short lowercase key, never containing the separator
    pub fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}"
    }

    /// A valid dot path of one to five segments
    pub fn path() -> impl Strategy<Value = Path> {
        prop::collection::vec(segment(), 1..=5).prop_filter_map("valid path", |segments| {
            Path::parse(&segments.join(".")).ok()
        })
    }

    /// A JSON leaf: null, bool, integer or string
    pub fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ]
    }

    /// A JSON state tree whose root is an object
    ///
    /// Nested values are objects, arrays or leaves, up to four levels deep.
    pub fn state_tree() -> impl Strategy<Value = Value> {
        let nested = leaf().prop_recursive(4, 48, 5, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::btree_map(segment(), inner, 0..5)
                    .prop_map(|members| Value::Object(members.into_iter().collect::<Map<_, _>>())),
            ]
        });
        prop::collection::btree_map(segment(), nested, 1..6)
            .prop_map(|members| Value::Object(members.into_iter().collect()))
    }

    /// Every leaf of `tree` with the path that reaches it
    ///
    /// Empty objects and arrays count as leaves. The root itself is never
    /// returned since paths have at least one segment.
    #[must_use]
    pub fn leaf_paths(tree: &Value) -> Vec<(Path, Value)> {
        let mut out = Vec::new();
        collect(tree, &mut Vec::new(), &mut out);
        out
    }

    fn collect(value: &Value, prefix: &mut Vec<String>, out: &mut Vec<(Path, Value)>) {
        let children: Vec<(String, &Value)> = match value {
            Value::Object(members) => members.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };

        if children.is_empty() {
            if let Ok(path) = Path::parse(&prefix.join(".")) {
                out.push((path, value.clone()));
            }
            return;
        }

        for (segment, child) in children {
            prefix.push(segment);
            collect(child, prefix, out);
            prefix.pop();
        }
    }
}
