//! Actions and dispatch
//!
//! Each slice declares one action enum with a variant per update function.
//! Routing inside a slice is therefore an exhaustive `match`; routing between
//! slices uses the slice name carried in [`ActionType`].
//!
//! `#[derive(Action)]` (from `slicekit-macros`) implements [`ActionKind`] and
//! generates a `<Enum>Dispatch` extension trait so that any [`Dispatch`]
//! target can be called as `counter.increment(5)`.

use std::fmt;

/// Names the update function an action invokes.
///
/// Usually derived. `kind()` is the snake-case variant name.
pub trait ActionKind {
    /// The kind of this action, e.g. `"increment"`.
    fn kind(&self) -> &'static str;

    /// Every kind this action type can take, in declaration order.
    fn kinds() -> &'static [&'static str]
    where
        Self: Sized;
}

/// The routing tag of an action: `"<slice>/<kind>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionType {
    slice: String,
    kind: &'static str,
}

impl ActionType {
    /// Create an action type for `kind` on `slice`.
    #[must_use]
    pub fn new(slice: impl Into<String>, kind: &'static str) -> Self {
        Self {
            slice: slice.into(),
            kind,
        }
    }

    /// The slice this action targets.
    #[must_use]
    pub fn slice(&self) -> &str {
        &self.slice
    }

    /// The update function this action invokes.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.slice, self.kind)
    }
}

/// An action addressed to a slice.
///
/// # Example
///
/// ```
/// use slicekit_core::action::{Action, ActionKind};
///
/// #[derive(Debug)]
/// enum CounterAction { Increment(i64) }
///
/// impl ActionKind for CounterAction {
///     fn kind(&self) -> &'static str { "increment" }
///     fn kinds() -> &'static [&'static str] { &["increment"] }
/// }
///
/// let action = Action::new("counter", CounterAction::Increment(5));
/// assert_eq!(action.action_type.to_string(), "counter/increment");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Action<P> {
    /// Routing tag.
    pub action_type: ActionType,
    /// The update function's arguments.
    pub payload: P,
}

impl<P: ActionKind> Action<P> {
    /// Tag `payload` for `slice`.
    #[must_use]
    pub fn new(slice: impl Into<String>, payload: P) -> Self {
        Self {
            action_type: ActionType::new(slice, payload.kind()),
            payload,
        }
    }
}

/// Something that accepts actions of type `A`.
///
/// Implemented by the runtime's slice handles; the generated
/// `<Enum>Dispatch` traits are blanket-implemented for every `Dispatch<Enum>`.
pub trait Dispatch<A> {
    /// What dispatching returns.
    type Output;

    /// Submit `action`.
    fn dispatch(&self, action: A) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum TodoAction {
        Add(String),
        Clear,
    }

    impl ActionKind for TodoAction {
        fn kind(&self) -> &'static str {
            match self {
                Self::Add(_) => "add",
                Self::Clear => "clear",
            }
        }

        fn kinds() -> &'static [&'static str] {
            &["add", "clear"]
        }
    }

    struct Recorder {
        seen: RefCell<Vec<Action<TodoAction>>>,
    }

    impl Dispatch<TodoAction> for Recorder {
        type Output = usize;

        fn dispatch(&self, action: TodoAction) -> usize {
            let mut seen = self.seen.borrow_mut();
            seen.push(Action::new("todos", action));
            seen.len()
        }
    }

    #[test]
    fn action_type_display() {
        let action_type = ActionType::new("todos", "add");
        assert_eq!(action_type.to_string(), "todos/add");
        assert_eq!(action_type.slice(), "todos");
        assert_eq!(action_type.kind(), "add");
    }

    #[test]
    fn action_takes_kind_from_payload() {
        let action = Action::new("todos", TodoAction::Clear);
        assert_eq!(action.action_type, ActionType::new("todos", "clear"));
        assert_eq!(action.payload, TodoAction::Clear);
    }

    #[test]
    fn dispatch_output_is_returned() {
        let recorder = Recorder {
            seen: RefCell::new(Vec::new()),
        };
        assert_eq!(recorder.dispatch(TodoAction::Add("milk".into())), 1);
        assert_eq!(recorder.dispatch(TodoAction::Clear), 2);
        assert_eq!(
            recorder.seen.borrow()[0].action_type.to_string(),
            "todos/add"
        );
    }
}
