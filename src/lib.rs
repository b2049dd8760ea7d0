//! Statewise: an async finite state machine engine.
//!
//! A machine is a registry of named states and the events that move between
//! them. Triggering an event runs a single-use [`Transition`] through ordered
//! phases, invoking the callbacks attached to the event, the states involved
//! and the machine itself:
//!
//! 1. **guard**: may cancel the transition; `trigger` then returns `false`
//! 2. **before**: last chance to act while still in the source state
//! 3. **mutation**: exit the source, switch state, enter the target
//! 4. **after**: runs once the new state is in place
//!
//! A failure during mutation restores the source state before it is
//! returned. Callbacks of one phase run concurrently and the phase waits for
//! all of them.
//!
//! # Core Concepts
//!
//! - **State / Event**: records identified by name, owning their actions
//! - **Callback**: a closure plus a [`Signature`](core::Signature) that picks
//!   what it receives from the transition's argument pool
//! - **Hooks**: machine-wide callbacks around every transition
//! - **History**: hooks that record completed transitions
//!
//! # Example
//!
//! ```rust
//! use statewise::builder::{EventBuilder, StateMachineBuilder};
//! use statewise::core::{Callback, Signature};
//! use statewise::{state_enum, History};
//! use serde_json::{json, Value};
//!
//! state_enum! {
//!     enum Door {
//!         Closed => "The door is closed",
//!         Open => "The door is open",
//!     }
//!     initial: Closed
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut machine = StateMachineBuilder::new()
//!     .state_enum::<Door>()
//!     .event(
//!         EventBuilder::new("open")
//!             .from(Door::Closed)
//!             .to(Door::Open)
//!             .guard(Callback::new(Signature::new().keyword("key"), |params| {
//!                 Ok(json!(params.kwarg("key") == Some(&json!("brass"))))
//!             })),
//!     )
//!     .event(EventBuilder::new("close").from(Door::Open).to(Door::Closed))
//!     .on_enter(Door::Open, Callback::new(Signature::transition(), |params| {
//!         let transition = params.transition().unwrap();
//!         println!("entered {}", transition.target());
//!         Ok(Value::Null)
//!     }))
//!     .hooks(History::new())
//!     .create()
//!     .await
//!     .unwrap();
//!
//! assert!(!machine.trigger("open").await.unwrap());
//!
//! let key = statewise::Arguments::new().kwarg("key", json!("brass"));
//! assert!(machine.trigger_with("open", key).await.unwrap());
//! assert!(*machine.state().unwrap() == Door::Open);
//! assert_eq!(machine.hooks().path(), vec!["Closed", "Open"]);
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod effects;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionType, Arguments, Callback, Event, Signature, State, StateEnum, Target,
    TransitionType,
};
pub use effects::{History, Hooks, NoHooks, SharedMachine, StateMachine, Transition, TransitionSnapshot};
pub use error::{ActionError, Error, Result};
