//! Tests for #[derive(StatePaths)] macro

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use serde::Serialize;
use serde_json::json;
use slicekit_core::path::{resolve, KeyPath};
use slicekit_macros::StatePaths;

#[derive(Clone, Debug, Serialize, StatePaths)]
struct UserState {
    name: String,
    profile: Profile,
    #[serde(rename = "labels")]
    tags: Vec<String>,
    #[serde(skip)]
    #[allow(dead_code)]
    session: Option<String>,
    r#type: String,
}

#[derive(Clone, Debug, Serialize, StatePaths)]
#[serde(rename_all = "camelCase")]
struct Profile {
    display_name: String,
    age: u32,
}

fn user() -> UserState {
    UserState {
        name: "ada".to_string(),
        profile: Profile {
            display_name: "Ada".to_string(),
            age: 36,
        },
        tags: vec!["admin".to_string()],
        session: None,
        r#type: "person".to_string(),
    }
}

#[test]
fn test_field_reads_and_names() {
    let state = user();
    assert_eq!(UserState::name.get(&state), "ada");
    assert_eq!(UserState::name.name(), "name");
    assert_eq!(UserState::r#type.name(), "type");
}

#[test]
fn test_composed_path_reads_nested_value() {
    let state = user();
    let age = UserState::profile.then(Profile::age);

    assert_eq!(*age.get(&state), 36);
    assert_eq!(age.to_string(), "profile.age");
}

#[test]
fn test_paths_follow_serde_renames() {
    assert_eq!(UserState::tags.path().to_string(), "labels");
    assert_eq!(
        UserState::profile.then(Profile::display_name).path().to_string(),
        "profile.displayName"
    );
}

#[test]
fn test_typed_path_agrees_with_dynamic_resolution() {
    let state = user();
    let value = serde_json::to_value(&state).unwrap();

    let display: KeyPath<UserState, String> = UserState::profile.then(Profile::display_name);
    let resolved = resolve(&value, &display.path()).unwrap();

    assert_eq!(resolved, &json!(display.get(&state)));

    let tags = resolve(&value, &UserState::tags.path()).unwrap();
    assert_eq!(tags, &json!(UserState::tags.get(&state)));
}
