//! Integration tests for the counter and user slices in one store
//!
//! These tests demonstrate the full end-to-end flow: assembly, wrapped
//! actions, typed paths and dot-path reads.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use counter::{
    app_store, CounterActionDispatch, CounterSlice, CounterState, Profile, UserActionDispatch,
    UserSlice, UserState,
};
use proptest::prelude::*;
use serde_json::json;
use slicekit_runtime::{Store, StoreConfig, StoreError};

fn store() -> Store {
    app_store(StoreConfig::default()).unwrap()
}

#[test]
fn test_initial_tree_holds_every_slice() {
    let store = store();
    assert_eq!(
        store.snapshot().unwrap(),
        json!({
            "counter": { "count": 0 },
            "user": {
                "name": "",
                "profile": { "displayName": "", "age": 0 },
                "tags": [],
            },
        })
    );
}

#[test]
fn test_increment_then_read_path() {
    let store = store();
    let counter = store.slice::<CounterSlice>("counter").unwrap();

    counter.increment(5).unwrap();

    assert_eq!(store.read_path("counter.count").unwrap(), json!(5));
}

#[test]
fn test_duplicate_user_slice_is_rejected() {
    let result = Store::builder().slice(UserSlice).slice(UserSlice).build();
    assert!(matches!(result, Err(StoreError::DuplicateSliceName(name)) if name == "user"));
}

#[test]
fn test_typed_paths_match_dot_paths() {
    let store = store();
    let user = store.slice::<UserSlice>("user").unwrap();
    user.rename("ada".to_string()).unwrap();
    user.set_age(36).unwrap();

    let age = UserState::profile.then(Profile::age);
    let display = UserState::profile.then(Profile::display_name);

    assert_eq!(
        store.read_path(&format!("user.{age}")).unwrap(),
        json!(user.read(age).unwrap())
    );
    assert_eq!(display.to_string(), "profile.displayName");
    assert_eq!(
        user.read_path(&display.to_string()).unwrap(),
        json!(user.read(display).unwrap())
    );
}

#[test]
fn test_user_actions_leave_counter_alone() {
    let store = store();
    let counter = store.slice::<CounterSlice>("counter").unwrap();
    counter.increment(3).unwrap();

    let user = store.slice::<UserSlice>("user").unwrap();
    user.add_tag("admin".to_string()).unwrap();
    let _ = user.set_age(500).unwrap_err();

    assert_eq!(counter.state().unwrap(), CounterState { count: 3 });
    assert_eq!(store.read_path("user.tags").unwrap(), json!(["admin"]));
    assert_eq!(store.read_path("user.profile.age").unwrap(), json!(0));
}

#[test]
fn test_missing_paths_name_the_failing_segment() {
    let store = store();
    let error = store.read_path("user.profile.email").unwrap_err();
    assert_eq!(
        error.to_string(),
        "Path 'user.profile.email' not found: no 'email' at depth 2"
    );
}

#[test]
fn test_handles_for_the_wrong_slice_type() {
    let store = store();
    assert!(matches!(
        store.slice::<UserSlice>("counter"),
        Err(StoreError::SliceTypeMismatch { .. })
    ));
}

proptest! {
    #[test]
    fn dispatching_to_one_slice_never_changes_another(steps in prop::collection::vec(-1000i64..1000, 1..20)) {
        let store = store();
        let user_before = store.read_path("user").unwrap();
        let counter = store.slice::<CounterSlice>("counter").unwrap();

        for step in &steps {
            counter.increment(*step).unwrap();
        }

        prop_assert_eq!(store.read_path("user").unwrap(), user_before);
        prop_assert_eq!(
            store.read_path("counter.count").unwrap(),
            json!(steps.iter().sum::<i64>())
        );
    }
}
