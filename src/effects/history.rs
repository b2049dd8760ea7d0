//! Transition history recording.
//!
//! [`History`] is a [`Hooks`] implementation that wraps another set of hooks
//! and appends every completed transition to an ordered log.

use crate::core::{Arguments, State};
use crate::effects::hooks::{Hooks, NoHooks};
use crate::effects::transition::Transition;
use crate::error::ActionError;
use async_trait::async_trait;
use std::time::Duration;

/// Hooks that record every completed transition.
///
/// Cancelled or failed transitions are not recorded. The log holds the live
/// transition handles, so entries carry their final timestamps.
///
/// # Example
///
/// ```rust
/// use statewise::{Event, History, State, StateMachine};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut machine = StateMachine::with_hooks(History::new());
/// machine.add_states([State::new("Draft"), State::new("Published")]).unwrap();
/// machine.add_event(Event::new("publish", "Published").from("Draft")).unwrap();
///
/// machine.enter_state("Draft").await.unwrap();
/// machine.trigger("publish").await.unwrap();
///
/// let history = machine.hooks();
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.path(), vec!["Draft", "Published"]);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct History<H: Hooks = NoHooks> {
    inner: H,
    transitions: Vec<Transition>,
}

impl History<NoHooks> {
    pub fn new() -> Self {
        Self::wrap(NoHooks)
    }
}

impl<H: Hooks> History<H> {
    /// Record transitions while delegating every hook to `inner`.
    pub fn wrap(inner: H) -> Self {
        Self {
            inner,
            transitions: Vec::new(),
        }
    }

    /// Recorded transitions, oldest first.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn last(&self) -> Option<&Transition> {
        self.transitions.last()
    }

    /// Names of the states traversed: the first source (if any), then each target.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(source) = self.transitions.first().and_then(Transition::source) {
            path.push(source.name());
        }
        path.extend(
            self.transitions
                .iter()
                .map(|transition| transition.target())
                .map(State::name),
        );
        path
    }

    /// Time from the first recorded start to the last recorded finish.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.first()?.started_at()?;
        let last = self.transitions.last()?.finished_at()?;
        last.signed_duration_since(first).to_std().ok()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

#[async_trait]
impl<H: Hooks> Hooks for History<H> {
    async fn guard_transition(
        &mut self,
        transition: &Transition,
        arguments: &Arguments,
    ) -> Result<bool, ActionError> {
        self.inner.guard_transition(transition, arguments).await
    }

    async fn before_transition(
        &mut self,
        transition: &Transition,
        arguments: &Arguments,
    ) -> Result<(), ActionError> {
        self.inner.before_transition(transition, arguments).await
    }

    async fn on_transition(
        &mut self,
        transition: &Transition,
        arguments: &Arguments,
    ) -> Result<(), ActionError> {
        self.inner.on_transition(transition, arguments).await
    }

    async fn after_transition(
        &mut self,
        transition: &Transition,
        arguments: &Arguments,
    ) -> Result<(), ActionError> {
        self.inner.after_transition(transition, arguments).await?;
        self.transitions.push(transition.clone());
        Ok(())
    }
}
