//! Error types for state machine registration and transition execution.

use crate::core::{ActionType, TransitionType};
use thiserror::Error;

/// Failure raised by an action or hook callback.
///
/// `Rejected` is the guard-style rejection signal: raised from a guard hook or
/// a guard action it cancels the transition instead of propagating.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("action failed: {0}")]
    Failed(String),

    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ActionError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Other(err)
    }
}

impl ActionError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Errors surfaced by the state machine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("a state named \"{name}\" already exists")]
    DuplicateState { name: String },

    #[error("an event named \"{name}\" already exists")]
    DuplicateEvent { name: String },

    #[error("\"{name}\" is reserved for the active state placeholder")]
    ReservedName { name: String },

    #[error("no state was found with the name \"{name}\"")]
    UnknownState { name: String },

    #[error("no event was found with the name \"{name}\"")]
    UnknownEvent { name: String },

    #[error("cannot add an event that references unknown states: {}", summarize(.names))]
    UnknownStates { names: Vec<String> },

    #[error("cannot add {owner} action with type \"{action_type}\": must be {}", summarize_types(.allowed))]
    InvalidActionType {
        owner: &'static str,
        action_type: ActionType,
        allowed: &'static [ActionType],
    },

    #[error("event trigger failed: the \"{event}\" event cannot be triggered from the current state of \"{state}\"")]
    InvalidSource { event: String, state: String },

    #[error("event trigger failed: the \"{event}\" event does not support initial state transitions")]
    InitialTransitionUnsupported { event: String },

    #[error("event trigger failed: cannot transition from a None state to another None state")]
    NullTransition { event: String },

    #[error("invalid {transition_type}: {reason}")]
    InvalidTransition {
        transition_type: TransitionType,
        reason: &'static str,
    },

    #[error("transition {id} has already been executed")]
    AlreadyExecuted { id: uuid::Uuid },

    #[error("transition {id} belongs to a different state machine")]
    ForeignTransition { id: uuid::Uuid },

    #[error("transition {id} starts from {}, but the machine is in {}", describe(.expected), describe(.current))]
    SourceMismatch {
        id: uuid::Uuid,
        expected: Option<String>,
        current: Option<String>,
    },

    #[error(transparent)]
    Action(#[from] ActionError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Join names into an English series: `"a"`, `"a" and "b"`, `"a", "b", and "c"`.
pub(crate) fn summarize_with(values: &[String], conjunction: &str) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} {conjunction} {second}"),
        [init @ .., last] => format!("{}, {conjunction} {last}", init.join(", ")),
    }
}

fn describe(state: &Option<String>) -> String {
    match state {
        Some(name) => format!("\"{name}\""),
        None => "no state".to_string(),
    }
}

fn summarize(values: &[String]) -> String {
    summarize_with(values, "and")
}

fn summarize_types(types: &[ActionType]) -> String {
    let names: Vec<String> = types.iter().map(|t| t.to_string()).collect();
    summarize_with(&names, "or")
}
