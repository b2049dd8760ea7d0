//! Builder for constructing state machines.

use crate::builder::error::{BuildError, Violation};
use crate::builder::event::EventBuilder;
use crate::core::{ActionType, Callback, State, StateEnum, Target};
use crate::effects::{Hooks, NoHooks, StateMachine};
use std::collections::BTreeSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<Violation>>;

/// Builder for constructing state machines with a fluent API.
///
/// Declarations are collected first and validated together, so
/// [`build`](Self::build) reports every problem at once.
///
/// # Example
///
/// ```
/// use statewise::builder::{EventBuilder, StateMachineBuilder};
/// use statewise::state_enum;
///
/// state_enum! {
///     enum Light {
///         Off => "No power",
///         On => "Full power",
///     }
///     initial: Off
/// }
///
/// let machine = StateMachineBuilder::new()
///     .state_enum::<Light>()
///     .event(EventBuilder::new("turn_on").from(Light::Off).to(Light::On))
///     .event(EventBuilder::new("turn_off").from(Light::On).to(Light::Off))
///     .build()
///     .unwrap();
///
/// assert!(*machine.state().unwrap() == Light::Off);
/// ```
pub struct StateMachineBuilder<H: Hooks = NoHooks> {
    states: Vec<State>,
    events: Vec<EventBuilder>,
    initial: Option<String>,
    state_actions: Vec<(String, ActionType, Callback)>,
    event_actions: Vec<(String, ActionType, Callback)>,
    hooks: H,
}

impl StateMachineBuilder<NoHooks> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            events: Vec::new(),
            initial: None,
            state_actions: Vec::new(),
            event_actions: Vec::new(),
            hooks: NoHooks,
        }
    }
}

impl Default for StateMachineBuilder<NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Hooks> StateMachineBuilder<H> {
    pub fn state(mut self, state: impl Into<State>) -> Self {
        self.states.push(state.into());
        self
    }

    pub fn states(mut self, states: impl IntoIterator<Item = State>) -> Self {
        self.states.extend(states);
        self
    }

    /// Declare every member of `E`, adopting its initial member unless an
    /// initial state is already set.
    pub fn state_enum<E: StateEnum>(mut self) -> Self {
        self.states.extend(State::from_enum::<E>());
        if self.initial.is_none() {
            self.initial = E::initial().map(|member| member.name().to_string());
        }
        self
    }

    pub fn initial(mut self, state: impl AsRef<str>) -> Self {
        self.initial = Some(state.as_ref().to_string());
        self
    }

    pub fn event(mut self, event: EventBuilder) -> Self {
        self.events.push(event);
        self
    }

    /// Attach an entry action to a declared state.
    pub fn on_enter(mut self, state: impl AsRef<str>, callback: Callback) -> Self {
        self.state_actions
            .push((state.as_ref().to_string(), ActionType::Entry, callback));
        self
    }

    /// Attach an exit action to a declared state.
    pub fn on_exit(mut self, state: impl AsRef<str>, callback: Callback) -> Self {
        self.state_actions
            .push((state.as_ref().to_string(), ActionType::Exit, callback));
        self
    }

    /// Attach an action to a declared event.
    pub fn event_action(
        mut self,
        event: impl AsRef<str>,
        action_type: ActionType,
        callback: Callback,
    ) -> Self {
        self.event_actions
            .push((event.as_ref().to_string(), action_type, callback));
        self
    }

    /// Replace the machine-wide hooks.
    pub fn hooks<T: Hooks>(self, hooks: T) -> StateMachineBuilder<T> {
        StateMachineBuilder {
            states: self.states,
            events: self.events,
            initial: self.initial,
            state_actions: self.state_actions,
            event_actions: self.event_actions,
            hooks,
        }
    }

    /// Check every declaration, accumulating all violations.
    pub fn validate(&self) -> Check {
        let mut checks: Vec<Check> = Vec::new();

        let mut seen = BTreeSet::new();
        for state in &self.states {
            checks.push(check(!state.is_active_placeholder(), || {
                Violation::ReservedName(state.name().to_string())
            }));
            checks.push(check(seen.insert(state.name()), || {
                Violation::DuplicateState(state.name().to_string())
            }));
        }
        let declared = |name: &str| self.states.iter().any(|state| state == name);

        if let Some(initial) = &self.initial {
            checks.push(check(declared(initial), || {
                Violation::UnknownInitialState(initial.clone())
            }));
        }

        let mut seen = BTreeSet::new();
        for event in &self.events {
            checks.push(check(seen.insert(event.name()), || {
                Violation::DuplicateEvent(event.name().to_string())
            }));
            let target = match event.target() {
                Some(Target::State(name)) => Some(name.as_str()),
                Some(Target::Active) => None,
                None => {
                    checks.push(Validation::fail(Violation::MissingTarget(
                        event.name().to_string(),
                    )));
                    None
                }
            };
            for state in event.sources().chain(target) {
                checks.push(check(declared(state), || Violation::UnknownEventState {
                    event: event.name().to_string(),
                    state: state.to_string(),
                }));
            }
        }

        for (state, action_type, _) in &self.state_actions {
            checks.push(check(declared(state), || {
                Violation::UnknownActionState(state.clone())
            }));
            checks.push(check(ActionType::STATE.contains(action_type), || {
                Violation::InvalidActionType {
                    owner: "state",
                    action_type: *action_type,
                }
            }));
        }
        for (event, action_type, _) in &self.event_actions {
            checks.push(check(
                self.events.iter().any(|declared| declared.name() == event),
                || Violation::UnknownActionEvent(event.clone()),
            ));
            checks.push(check(ActionType::EVENT.contains(action_type), || {
                Violation::InvalidActionType {
                    owner: "event",
                    action_type: *action_type,
                }
            }));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the state machine.
    ///
    /// The initial state, if any, is assigned without running its entry
    /// actions. Use [`create`](Self::create) to enter it through a transition.
    pub fn build(self) -> Result<StateMachine<H>, BuildError> {
        if let Validation::Failure(violations) = self.validate() {
            return Err(BuildError::Invalid(violations.iter().cloned().collect()));
        }

        let Self {
            mut states,
            events,
            initial,
            state_actions,
            event_actions,
            hooks,
        } = self;

        for (name, action_type, callback) in state_actions {
            if let Some(state) = states.iter_mut().find(|state| **state == name) {
                state.add_action(callback, action_type)?;
            }
        }

        let mut events = events
            .into_iter()
            .map(EventBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        for (name, action_type, callback) in event_actions {
            if let Some(event) = events.iter_mut().find(|event| event.name() == name) {
                event.add_action(callback, action_type)?;
            }
        }

        let machine = StateMachine::from_parts(states, events, initial.as_deref(), hooks)?;
        tracing::debug!(
            machine = %machine.id(),
            states = machine.states().len(),
            events = machine.events().len(),
            initial = initial.as_deref(),
            "state machine built"
        );
        Ok(machine)
    }

    /// Build the state machine and enter the initial state through a
    /// transition, so its entry actions run.
    ///
    /// A guard cancelling that transition is reported as
    /// [`BuildError::InitialStateRejected`].
    pub async fn create(self) -> Result<StateMachine<H>, BuildError> {
        let initial = self.initial.clone();
        let mut machine = self.build()?;

        if let Some(state) = initial {
            machine.current.set(None);
            if !machine.enter_state(&state).await? {
                return Err(BuildError::InitialStateRejected { state });
            }
        }
        Ok(machine)
    }
}

fn check(ok: bool, violation: impl FnOnce() -> Violation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}
