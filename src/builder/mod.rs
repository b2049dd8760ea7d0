//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and the [`state_enum!`](crate::state_enum)
//! macro for declaring states, events and their actions up front. Builders
//! only call the registration API of [`StateMachine`](crate::StateMachine),
//! [`State`](crate::core::State) and [`Event`](crate::core::Event).

pub mod error;
pub mod event;
pub mod machine;
pub mod macros;

pub use error::{BuildError, Violation};
pub use event::EventBuilder;
pub use machine::StateMachineBuilder;
