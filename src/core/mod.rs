//! Entity model and callback plumbing.
//!
//! This module contains the records a state machine is built from:
//! - States, declared directly or via the `StateEnum` trait
//! - Events connecting source states to a target
//! - Actions: tagged callbacks with a cached signature
//! - Parameter matching that lets callbacks of different shapes share one pool
//! - Guard verdicts

mod action;
mod event;
mod guard;
mod signature;
mod state;

pub use action::{Action, ActionResult, ActionType, Callback};
pub use event::{Event, TransitionType};
pub use guard::{combine as combine_guards, is_truthy, Verdict};
pub use signature::{Arg, Arguments, Parameter, ParameterKind, Params, Pool, Signature};
pub use state::{State, StateEnum, Target};

pub(crate) use action::run_all;
pub(crate) use guard::from_hook as hook_verdict;
