//! Tests for #[derive(Action)] macro

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use slicekit_core::action::{ActionKind, Dispatch};
use slicekit_macros::Action;
use std::cell::RefCell;

#[derive(Action, Clone, Debug, PartialEq)]
enum TodoAction {
    AddTodo { title: String, priority: u8 },
    Toggle(usize),
    Move(usize, usize),
    ClearCompleted,
    #[action(kind = "rename")]
    UpdateTitle { index: usize, title: String },
}

/// Collects everything dispatched to it.
#[derive(Default)]
struct Recorder {
    seen: RefCell<Vec<TodoAction>>,
}

impl Dispatch<TodoAction> for Recorder {
    type Output = usize;

    fn dispatch(&self, action: TodoAction) -> usize {
        let mut seen = self.seen.borrow_mut();
        seen.push(action);
        seen.len()
    }
}

#[test]
fn test_kind_is_snake_case_variant_name() {
    let action = TodoAction::AddTodo {
        title: "Write docs".to_string(),
        priority: 1,
    };
    assert_eq!(action.kind(), "add_todo");
    assert_eq!(TodoAction::Toggle(0).kind(), "toggle");
    assert_eq!(TodoAction::ClearCompleted.kind(), "clear_completed");
}

#[test]
fn test_kind_override() {
    let action = TodoAction::UpdateTitle {
        index: 0,
        title: "x".to_string(),
    };
    assert_eq!(action.kind(), "rename");
}

#[test]
fn test_kinds_lists_every_variant_in_order() {
    assert_eq!(
        TodoAction::kinds(),
        &["add_todo", "toggle", "move", "clear_completed", "rename"]
    );
}

#[test]
fn test_wrapped_methods_build_the_variant() {
    let recorder = Recorder::default();

    assert_eq!(recorder.add_todo("Write docs".to_string(), 2), 1);
    assert_eq!(recorder.toggle(3), 2);
    assert_eq!(recorder.r#move(0, 1), 3);
    assert_eq!(recorder.clear_completed(), 4);
    assert_eq!(recorder.update_title(1, "Ship".to_string()), 5);

    assert_eq!(
        recorder.seen.into_inner(),
        vec![
            TodoAction::AddTodo {
                title: "Write docs".to_string(),
                priority: 2,
            },
            TodoAction::Toggle(3),
            TodoAction::Move(0, 1),
            TodoAction::ClearCompleted,
            TodoAction::UpdateTitle {
                index: 1,
                title: "Ship".to_string(),
            },
        ]
    );
}

#[test]
fn test_wrapped_methods_work_through_trait_objects() {
    let recorder = Recorder::default();
    let dispatcher: &dyn Dispatch<TodoAction, Output = usize> = &recorder;

    dispatcher.toggle(7);

    assert_eq!(recorder.seen.borrow().as_slice(), &[TodoAction::Toggle(7)]);
}

mod visibility {
    use slicekit_macros::Action;

    #[derive(Action, Debug)]
    pub enum PublicAction {
        Ping,
    }
}

#[test]
fn test_dispatch_trait_follows_enum_visibility() {
    use visibility::{PublicAction, PublicActionDispatch};

    struct Counter(RefCell<u32>);

    impl Dispatch<PublicAction> for Counter {
        type Output = ();

        fn dispatch(&self, _action: PublicAction) {
            *self.0.borrow_mut() += 1;
        }
    }

    let counter = Counter(RefCell::new(0));
    counter.ping();
    counter.ping();
    assert_eq!(*counter.0.borrow(), 2);
}
