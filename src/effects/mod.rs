//! Transition execution around the entity model.
//!
//! This module is the effectful shell: it owns the current-state pointer and
//! runs callbacks, while [`crate::core`] only describes states, events and
//! actions.
//!
//! # Key Concepts
//!
//! - **State Machine**: registry of states and events plus the current state
//! - **Transition**: single-use run of one state change, phase by phase
//! - **Hooks**: machine-wide callbacks around every transition
//! - **History**: hooks that log completed transitions
//! - **Shared Machine**: opt-in mutex for triggering from several tasks

mod history;
mod hooks;
mod machine;
mod shared;
mod transition;

pub use history::History;
pub use hooks::{Hooks, NoHooks};
pub use machine::StateMachine;
pub use shared::SharedMachine;
pub use transition::{Transition, TransitionSnapshot};
