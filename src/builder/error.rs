//! Build errors for state machine and event builders.

use crate::core::ActionType;
use crate::error::Error;
use thiserror::Error;

/// A single problem found while validating a builder.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("state \"{0}\" is declared more than once")]
    DuplicateState(String),

    #[error("event \"{0}\" is declared more than once")]
    DuplicateEvent(String),

    #[error("\"{0}\" is reserved for the active state placeholder")]
    ReservedName(String),

    #[error("initial state \"{0}\" is not declared")]
    UnknownInitialState(String),

    #[error("event \"{event}\" references undeclared state \"{state}\"")]
    UnknownEventState { event: String, state: String },

    #[error("event \"{0}\" has no target. Call .to(state) or .to_active()")]
    MissingTarget(String),

    #[error("action attached to undeclared state \"{0}\"")]
    UnknownActionState(String),

    #[error("action attached to undeclared event \"{0}\"")]
    UnknownActionEvent(String),

    #[error("{owner} actions cannot have type \"{action_type}\"")]
    InvalidActionType {
        owner: &'static str,
        action_type: ActionType,
    },
}

/// Errors that can occur when building state machines and events.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid state machine: {}", join(.0))]
    Invalid(Vec<Violation>),

    #[error("initial state \"{state}\" was not entered: transition cancelled by a guard")]
    InitialStateRejected { state: String },

    #[error(transparent)]
    Machine(#[from] Error),
}

impl BuildError {
    /// Violations found during validation, empty for other errors.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_violation() {
        let err = BuildError::Invalid(vec![
            Violation::DuplicateState("On".into()),
            Violation::MissingTarget("go".into()),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid state machine: state \"On\" is declared more than once; \
             event \"go\" has no target. Call .to(state) or .to_active()"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn machine_errors_are_transparent() {
        let err = BuildError::from(Error::UnknownState { name: "X".into() });
        assert_eq!(err.to_string(), "no state was found with the name \"X\"");
        assert!(err.violations().is_empty());
    }
}
