//! Events: named, directed relations between states.

use super::action::{Action, ActionList, ActionType, Callback};
use super::state::Target;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// How a transition treats the states it moves between.
///
/// External transitions move from one state to a different one. Internal
/// and self transitions stay in the same state; a self transition exits and
/// re-enters it (running exit and entry actions), an internal one does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    External,
    Internal,
    #[serde(rename = "self")]
    SelfTransition,
}

impl TransitionType {
    /// Whether the source is exited and the target entered.
    pub fn reenters(&self) -> bool {
        matches!(self, Self::External | Self::SelfTransition)
    }
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::External => "External Transition",
            Self::Internal => "Internal Transition",
            Self::SelfTransition => "Self Transition",
        })
    }
}

/// Something that happens within a state machine and changes its state.
///
/// A `None` source marks the event as usable for an initial transition,
/// triggered while the machine has no current state.
///
/// # Example
///
/// ```rust
/// use statewise::core::{Event, Target};
///
/// let start = Event::new("start", "Idle").from_initial();
/// let tick = Event::new("tick", Target::Active).from("Idle").from("Running");
///
/// assert!(start.accepts(None));
/// assert!(tick.accepts(Some("Running")));
/// assert!(!tick.accepts(None));
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Event {
    name: String,
    description: Option<String>,
    sources: Vec<Option<String>>,
    target: Target,
    transition_type: Option<TransitionType>,
    #[serde(skip)]
    actions: ActionList,
}

impl Event {
    pub fn new(name: impl Into<String>, target: impl Into<Target>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sources: Vec::new(),
            target: target.into(),
            transition_type: None,
            actions: ActionList::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Allow triggering from `state`.
    pub fn from(mut self, state: impl AsRef<str>) -> Self {
        self.sources.push(Some(state.as_ref().to_string()));
        self
    }

    /// Allow triggering while the machine has no current state.
    pub fn from_initial(mut self) -> Self {
        self.sources.push(None);
        self
    }

    pub fn with_transition_type(mut self, transition_type: TransitionType) -> Self {
        self.transition_type = Some(transition_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn sources(&self) -> &[Option<String>] {
        &self.sources
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn transition_type(&self) -> Option<TransitionType> {
        self.transition_type
    }

    pub fn is_initial(&self) -> bool {
        self.sources.iter().any(Option::is_none)
    }

    /// Whether the event may fire while the machine is in `current`.
    pub fn accepts(&self, current: Option<&str>) -> bool {
        self.sources.iter().any(|source| source.as_deref() == current)
    }

    /// Every state the event references: named sources plus a named target.
    pub fn states(&self) -> BTreeSet<&str> {
        self.sources
            .iter()
            .flatten()
            .map(String::as_str)
            .chain(self.target.name())
            .collect()
    }

    pub fn references(&self, state: &str) -> bool {
        self.states().contains(state)
    }

    pub fn actions(&self) -> &[Action] {
        self.actions.all()
    }

    pub fn get_actions(&self, action_type: ActionType) -> Vec<Action> {
        self.actions.of(action_type)
    }

    /// Attach a guard, before, on or after action.
    pub fn add_action(&mut self, callback: Callback, action_type: ActionType) -> Result<Action> {
        if !ActionType::EVENT.contains(&action_type) {
            return Err(Error::InvalidActionType {
                owner: "event",
                action_type,
                allowed: ActionType::EVENT,
            });
        }
        let action = Action::new(action_type, callback);
        self.actions.push(action.clone());
        Ok(action)
    }

    pub fn remove_action(&mut self, action: &Action) -> Option<Action> {
        self.actions.remove(action)
    }

    pub fn remove_actions_of(&mut self, action_type: ActionType) -> usize {
        self.actions.remove_type(action_type)
    }

    pub fn clear_actions(&mut self) {
        self.actions.clear();
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .field("target", &self.target)
            .field("transition_type", &self.transition_type)
            .field("actions", &self.actions.all().len())
            .finish()
    }
}

impl AsRef<str> for Event {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialEq<str> for Event {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Event {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Signature, State};
    use serde_json::Value;

    fn noop() -> Callback {
        Callback::new(Signature::new(), |_| Ok(Value::Null))
    }

    #[test]
    fn states_unions_sources_and_target() {
        let event = Event::new("go", "B").from("A").from_initial().from("C");
        let states: Vec<&str> = event.states().into_iter().collect();
        assert_eq!(states, vec!["A", "B", "C"]);
    }

    #[test]
    fn active_target_is_not_a_referenced_state() {
        let event = Event::new("tick", Target::Active).from("A");
        assert!(event.references("A"));
        assert!(!event.references(State::ACTIVE));
        assert_eq!(event.states().len(), 1);
    }

    #[test]
    fn accepts_checks_sources_including_initial() {
        let event = Event::new("go", "B").from("A");
        assert!(event.accepts(Some("A")));
        assert!(!event.accepts(Some("B")));
        assert!(!event.accepts(None));
        assert!(!event.is_initial());

        let initial = event.from_initial();
        assert!(initial.accepts(None));
        assert!(initial.is_initial());
    }

    #[test]
    fn event_accepts_only_event_action_types() {
        let mut event = Event::new("go", "B").from("A");
        for action_type in ActionType::EVENT {
            assert!(event.add_action(noop(), *action_type).is_ok());
        }
        let err = event.add_action(noop(), ActionType::Entry).unwrap_err();
        assert!(matches!(err, Error::InvalidActionType { owner: "event", .. }));
        assert_eq!(event.actions().len(), 4);
        assert_eq!(event.get_actions(ActionType::On).len(), 1);
    }

    #[test]
    fn equality_uses_name_only() {
        let a = Event::new("go", "B").from("A");
        let b = Event::new("go", "C");
        assert_eq!(a, b);
        assert_eq!(a, "go");
    }

    #[test]
    fn transition_type_reentry() {
        assert!(TransitionType::External.reenters());
        assert!(TransitionType::SelfTransition.reenters());
        assert!(!TransitionType::Internal.reenters());
        assert_eq!(
            serde_json::to_string(&TransitionType::SelfTransition).unwrap(),
            "\"self\""
        );
    }
}
