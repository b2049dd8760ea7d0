//! State machine that registers states and events and runs transitions.

use crate::core::{Arguments, Event, State, Target, TransitionType};
use crate::effects::hooks::{Hooks, NoHooks};
use crate::effects::transition::Transition;
use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use uuid::Uuid;

/// An ordered registry of states and events with a current-state pointer.
///
/// Transitions are produced only by [`trigger`](Self::trigger) and
/// [`enter_state`](Self::enter_state). Both borrow the machine mutably for
/// the whole run, so one machine executes at most one transition at a time.
/// Wrap it in a [`SharedMachine`](crate::SharedMachine) to trigger from
/// several tasks.
///
/// # Example
///
/// ```rust
/// use statewise::{Event, State, StateMachine};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut machine = StateMachine::new();
/// machine.add_states([State::new("Off"), State::new("On")]).unwrap();
/// machine.add_event(Event::new("turn_on", "On").from("Off")).unwrap();
/// machine.add_event(Event::new("turn_off", "Off").from("On")).unwrap();
///
/// machine.enter_state("Off").await.unwrap();
/// assert!(machine.trigger("turn_on").await.unwrap());
/// assert_eq!(machine.state().unwrap(), "On");
/// # }
/// ```
pub struct StateMachine<H: Hooks = NoHooks> {
    id: Uuid,
    states: Vec<State>,
    events: Vec<Event>,
    pub(crate) current: CurrentState,
    pub(crate) hooks: H,
}

/// The name of the current state, shared with the machine's transitions.
///
/// Only ever names a registered state, or nothing.
#[derive(Clone, Debug, Default)]
pub(crate) struct CurrentState(Arc<RwLock<Option<String>>>);

impl CurrentState {
    pub(crate) fn get(&self) -> Option<String> {
        self.0.read().clone()
    }

    pub(crate) fn set(&self, name: Option<&str>) {
        *self.0.write() = name.map(str::to_string);
    }

    pub(crate) fn is(&self, name: Option<&str>) -> bool {
        self.0.read().as_deref() == name
    }
}

impl StateMachine<NoHooks> {
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl Default for StateMachine<NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Hooks> StateMachine<H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self {
            id: Uuid::new_v4(),
            states: Vec::new(),
            events: Vec::new(),
            current: CurrentState::default(),
            hooks,
        }
    }

    /// Assemble a machine from registered parts.
    ///
    /// The initial state is assigned directly: no transition runs, so its
    /// entry actions do not fire. Call [`enter_state`](Self::enter_state)
    /// afterwards when they should.
    pub fn from_parts(
        states: impl IntoIterator<Item = State>,
        events: impl IntoIterator<Item = Event>,
        initial: Option<&str>,
        hooks: H,
    ) -> Result<Self> {
        let mut machine = Self::with_hooks(hooks);
        machine.add_states(states)?;
        machine.add_events(events)?;
        if let Some(name) = initial {
            let state = machine.require_state(name)?;
            machine.current.set(Some(state.name()));
        }
        Ok(machine)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current state, `None` while indeterminate.
    pub fn state(&self) -> Option<&State> {
        self.get_state(self.current.get()?)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    // States

    pub fn add_state(&mut self, state: State) -> Result<()> {
        if state.is_active_placeholder() {
            return Err(Error::ReservedName {
                name: state.name().to_string(),
            });
        }
        if self.get_state(state.name()).is_some() {
            return Err(Error::DuplicateState {
                name: state.name().to_string(),
            });
        }
        tracing::trace!(state = %state, "state added");
        self.states.push(state);
        Ok(())
    }

    pub fn add_states(&mut self, states: impl IntoIterator<Item = State>) -> Result<()> {
        states.into_iter().try_for_each(|state| self.add_state(state))
    }

    /// Remove a state and every event that references it.
    ///
    /// Removing the current state leaves the machine indeterminate.
    pub fn remove_state(&mut self, name: impl AsRef<str>) -> Option<State> {
        let name = name.as_ref();
        let index = self.states.iter().position(|state| state == name)?;
        let state = self.states.remove(index);

        let before = self.events.len();
        self.events.retain(|event| !event.references(name));
        if self.current.is(Some(name)) {
            self.current.set(None);
        }
        tracing::trace!(
            state = name,
            events_removed = before - self.events.len(),
            "state removed"
        );
        Some(state)
    }

    pub fn remove_states<I, S>(&mut self, names: I) -> Vec<State>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.remove_state(name))
            .collect()
    }

    pub fn get_state(&self, name: impl AsRef<str>) -> Option<&State> {
        let name = name.as_ref();
        self.states.iter().find(|state| *state == name)
    }

    pub fn get_state_mut(&mut self, name: impl AsRef<str>) -> Option<&mut State> {
        let name = name.as_ref();
        self.states.iter_mut().find(|state| **state == name)
    }

    /// The named states that exist, in machine order. Unknown names are skipped.
    pub fn get_states<I, S>(&self, names: I) -> Vec<&State>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        self.states
            .iter()
            .filter(|state| wanted.contains(state.name()))
            .collect()
    }

    // Events

    /// Register an event. Every state it references must already exist;
    /// all missing states are reported together.
    pub fn add_event(&mut self, event: Event) -> Result<()> {
        if self.get_event(event.name()).is_some() {
            return Err(Error::DuplicateEvent {
                name: event.name().to_string(),
            });
        }

        let checks: Vec<Validation<(), NonEmptyVec<String>>> = event
            .states()
            .into_iter()
            .map(|name| {
                if self.get_state(name).is_some() {
                    Validation::success(())
                } else {
                    Validation::fail(name.to_string())
                }
            })
            .collect();
        if let Validation::Failure(missing) = Validation::all_vec(checks).map(|_| ()) {
            return Err(Error::UnknownStates {
                names: missing.iter().cloned().collect(),
            });
        }

        tracing::trace!(event = event.name(), "event added");
        self.events.push(event);
        Ok(())
    }

    pub fn add_events(&mut self, events: impl IntoIterator<Item = Event>) -> Result<()> {
        events.into_iter().try_for_each(|event| self.add_event(event))
    }

    pub fn remove_event(&mut self, name: impl AsRef<str>) -> Option<Event> {
        let name = name.as_ref();
        let index = self.events.iter().position(|event| event == name)?;
        Some(self.events.remove(index))
    }

    pub fn remove_events<I, S>(&mut self, names: I) -> Vec<Event>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.remove_event(name))
            .collect()
    }

    pub fn get_event(&self, name: impl AsRef<str>) -> Option<&Event> {
        let name = name.as_ref();
        self.events.iter().find(|event| *event == name)
    }

    pub fn get_event_mut(&mut self, name: impl AsRef<str>) -> Option<&mut Event> {
        let name = name.as_ref();
        self.events.iter_mut().find(|event| **event == name)
    }

    // Transitions

    pub async fn trigger(&mut self, event: impl AsRef<str>) -> Result<bool> {
        self.trigger_with(event, Arguments::new()).await
    }

    /// Trigger an event, passing `arguments` through to hooks and actions.
    ///
    /// Returns `Ok(false)` when a guard cancels the transition.
    pub async fn trigger_with(
        &mut self,
        event: impl AsRef<str>,
        arguments: Arguments,
    ) -> Result<bool> {
        let event = self.require_event(event.as_ref())?.clone();
        let current = self.state().cloned();

        if !event.accepts(current.as_ref().map(State::name)) {
            return Err(match current {
                Some(state) => Error::InvalidSource {
                    event: event.name().to_string(),
                    state: state.name().to_string(),
                },
                None => Error::InitialTransitionUnsupported {
                    event: event.name().to_string(),
                },
            });
        }

        let target = match event.target() {
            Target::State(name) => self.require_state(name)?.clone(),
            Target::Active => current.clone().ok_or_else(|| Error::NullTransition {
                event: event.name().to_string(),
            })?,
        };

        let transition = Transition::new(self, current, target, Some(event), None)?;
        transition.execute(self, arguments).await
    }

    pub async fn enter_state(&mut self, state: impl AsRef<str>) -> Result<bool> {
        self.enter_state_with(state, Arguments::new(), None).await
    }

    /// Move directly to `state` without an event.
    ///
    /// The type defaults to a self transition when already in `state` and
    /// to an external one otherwise.
    pub async fn enter_state_with(
        &mut self,
        state: impl AsRef<str>,
        arguments: Arguments,
        transition_type: Option<TransitionType>,
    ) -> Result<bool> {
        let target = self.require_state(state.as_ref())?.clone();
        let current = self.state().cloned();
        let transition_type = transition_type.unwrap_or(if current.as_ref() == Some(&target) {
            TransitionType::SelfTransition
        } else {
            TransitionType::External
        });

        let transition = Transition::new(self, current, target, None, Some(transition_type))?;
        transition.execute(self, arguments).await
    }

    pub(crate) fn require_state(&self, name: &str) -> Result<&State> {
        self.get_state(name).ok_or_else(|| Error::UnknownState {
            name: name.to_string(),
        })
    }

    fn require_event(&self, name: &str) -> Result<&Event> {
        self.get_event(name).ok_or_else(|| Error::UnknownEvent {
            name: name.to_string(),
        })
    }
}

impl<H: Hooks + std::fmt::Debug> std::fmt::Debug for StateMachine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("state", &self.current.get())
            .field("states", &self.states)
            .field("events", &self.events)
            .field("hooks", &self.hooks)
            .finish()
    }
}
