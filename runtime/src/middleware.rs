//! Middleware around dispatch.
//!
//! Middleware see every action before and after it reaches its slice. They
//! run in registration order; the first one to return
//! [`MiddlewareDecision::Skip`] stops the chain and the reducer is not run.

use crate::error::StoreError;
use crate::tree::StateTree;
use slicekit_core::action::ActionType;

/// A dispatched action as seen by middleware and action subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Routing tag of the action.
    pub action_type: ActionType,
    /// `Debug` rendering of the payload.
    pub payload: String,
}

impl ActionRecord {
    /// Record an action of type `action_type` carrying `payload`.
    #[must_use]
    pub fn new(action_type: ActionType, payload: &impl std::fmt::Debug) -> Self {
        Self {
            action_type,
            payload: format!("{payload:?}"),
        }
    }
}

/// Whether an action should continue to its reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareDecision {
    /// Pass the action on.
    Continue,
    /// Drop the action; the reducer is not run.
    Skip,
}

/// What happened to an action.
#[derive(Debug)]
pub enum DispatchOutcome<'a> {
    /// The reducer ran and the state moved to `version`.
    Applied {
        /// Store version after the action.
        version: u64,
    },
    /// A middleware skipped the action.
    Skipped,
    /// Dispatch failed; state is unchanged.
    Failed(&'a StoreError),
}

/// Hooks run around every dispatch.
///
/// `before` runs while the store holds its write lock and must not call back
/// into the store. `after` runs once the lock is released.
pub trait Middleware: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Inspect an action before its reducer runs.
    fn before(&self, _record: &ActionRecord, _state: &StateTree) -> MiddlewareDecision {
        MiddlewareDecision::Continue
    }

    /// Observe the outcome of an action.
    fn after(&self, _record: &ActionRecord, _outcome: &DispatchOutcome<'_>) {}
}

/// Logs every action and its outcome through `tracing`.
///
/// Installed automatically when [`StoreConfig::log_actions`](crate::StoreConfig)
/// is set.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    fn before(&self, record: &ActionRecord, _state: &StateTree) -> MiddlewareDecision {
        tracing::debug!(
            action_type = %record.action_type,
            payload = %record.payload,
            "Dispatching action"
        );
        MiddlewareDecision::Continue
    }

    fn after(&self, record: &ActionRecord, outcome: &DispatchOutcome<'_>) {
        match outcome {
            DispatchOutcome::Applied { version } => {
                tracing::debug!(action_type = %record.action_type, version, "Action applied");
            },
            DispatchOutcome::Skipped => {
                tracing::debug!(action_type = %record.action_type, "Action skipped");
            },
            DispatchOutcome::Failed(error) => {
                tracing::warn!(action_type = %record.action_type, error = %error, "Action failed");
            },
        }
    }
}
