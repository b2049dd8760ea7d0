//! Exclusive access to a state machine shared between tasks.

use crate::core::{Arguments, TransitionType};
use crate::effects::hooks::Hooks;
use crate::effects::machine::StateMachine;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// A state machine behind an async mutex.
///
/// Every `trigger`/`enter_state` holds the lock from event resolution until
/// the outcome is returned, so concurrent callers are serialized and each
/// guard sees the state left by the previous transition.
///
/// # Example
///
/// ```rust
/// use statewise::{Event, SharedMachine, State, StateMachine};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut machine = StateMachine::new();
/// machine.add_states([State::new("Off"), State::new("On")]).unwrap();
/// machine.add_event(Event::new("toggle", "On").from("Off")).unwrap();
/// machine.enter_state("Off").await.unwrap();
///
/// let shared = SharedMachine::new(machine);
/// let handle = shared.clone();
/// tokio::spawn(async move { handle.trigger("toggle").await })
///     .await
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(shared.current_state().await.as_deref(), Some("On"));
/// # }
/// ```
pub struct SharedMachine<H: Hooks> {
    inner: Arc<Mutex<StateMachine<H>>>,
}

impl<H: Hooks> Clone for SharedMachine<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: Hooks> SharedMachine<H> {
    pub fn new(machine: StateMachine<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(machine)),
        }
    }

    /// Lock the machine for direct use, e.g. registration or a batch of
    /// transitions that must not interleave with other callers.
    pub async fn lock(&self) -> MutexGuard<'_, StateMachine<H>> {
        self.inner.lock().await
    }

    /// Name of the current state.
    pub async fn current_state(&self) -> Option<String> {
        let machine = self.inner.lock().await;
        machine.state().map(|state| state.name().to_string())
    }

    pub async fn trigger(&self, event: impl AsRef<str> + Send) -> Result<bool> {
        self.trigger_with(event, Arguments::new()).await
    }

    pub async fn trigger_with(
        &self,
        event: impl AsRef<str> + Send,
        arguments: Arguments,
    ) -> Result<bool> {
        let mut machine = self.inner.lock().await;
        machine.trigger_with(event, arguments).await
    }

    pub async fn enter_state(&self, state: impl AsRef<str> + Send) -> Result<bool> {
        self.enter_state_with(state, Arguments::new(), None).await
    }

    pub async fn enter_state_with(
        &self,
        state: impl AsRef<str> + Send,
        arguments: Arguments,
        transition_type: Option<TransitionType>,
    ) -> Result<bool> {
        let mut machine = self.inner.lock().await;
        machine
            .enter_state_with(state, arguments, transition_type)
            .await
    }

    /// Recover the machine when this is the last handle.
    pub fn try_unwrap(self) -> std::result::Result<StateMachine<H>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
