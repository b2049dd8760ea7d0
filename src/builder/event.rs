//! Builder for constructing events.

use crate::builder::error::{BuildError, Violation};
use crate::core::{ActionType, Callback, Event, StateEnum, Target, TransitionType};

/// Builder for constructing events with a fluent API.
///
/// # Example
///
/// ```
/// use statewise::builder::EventBuilder;
/// use statewise::core::{Callback, Signature};
/// use serde_json::json;
///
/// let event = EventBuilder::new("turn_on")
///     .description("Switch the light on")
///     .from("Off")
///     .to("On")
///     .guard(Callback::new(Signature::new(), |_| Ok(json!(true))))
///     .build()
///     .unwrap();
///
/// assert!(event.accepts(Some("Off")));
/// assert_eq!(event.actions().len(), 1);
/// ```
#[derive(Debug)]
pub struct EventBuilder {
    name: String,
    description: Option<String>,
    sources: Vec<Option<String>>,
    target: Option<Target>,
    transition_type: Option<TransitionType>,
    actions: Vec<(ActionType, Callback)>,
}

impl EventBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sources: Vec::new(),
            target: None,
            transition_type: None,
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a source state.
    pub fn from(mut self, state: impl AsRef<str>) -> Self {
        self.sources.push(Some(state.as_ref().to_string()));
        self
    }

    /// Allow the event as an initial transition.
    pub fn from_initial(mut self) -> Self {
        self.sources.push(None);
        self
    }

    /// Add every member of a state enumeration as a source.
    pub fn from_any<E: StateEnum>(mut self) -> Self {
        self.sources
            .extend(E::variants().iter().map(|member| Some(member.name().to_string())));
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl AsRef<str>) -> Self {
        self.target = Some(Target::from(state.as_ref()));
        self
    }

    /// Target whatever state is current when the event fires.
    pub fn to_active(mut self) -> Self {
        self.target = Some(Target::Active);
        self
    }

    pub fn transition_type(mut self, transition_type: TransitionType) -> Self {
        self.transition_type = Some(transition_type);
        self
    }

    pub fn guard(self, callback: Callback) -> Self {
        self.action(ActionType::Guard, callback)
    }

    pub fn before(self, callback: Callback) -> Self {
        self.action(ActionType::Before, callback)
    }

    pub fn on(self, callback: Callback) -> Self {
        self.action(ActionType::On, callback)
    }

    pub fn after(self, callback: Callback) -> Self {
        self.action(ActionType::After, callback)
    }

    fn action(mut self, action_type: ActionType, callback: Callback) -> Self {
        self.actions.push((action_type, callback));
        self
    }

    pub(crate) fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().flatten().map(String::as_str)
    }

    pub(crate) fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Build the event.
    pub fn build(self) -> Result<Event, BuildError> {
        let target = self
            .target
            .ok_or_else(|| BuildError::Invalid(vec![Violation::MissingTarget(self.name.clone())]))?;

        let mut event = Event::new(self.name, target);
        if let Some(description) = self.description {
            event = event.with_description(description);
        }
        if let Some(transition_type) = self.transition_type {
            event = event.with_transition_type(transition_type);
        }
        for source in self.sources {
            event = match source {
                Some(state) => event.from(state),
                None => event.from_initial(),
            };
        }
        for (action_type, callback) in self.actions {
            event.add_action(callback, action_type)?;
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Signature;
    use crate::state_enum;
    use serde_json::Value;

    state_enum! {
        enum Light {
            Off => "No power",
            Dimmed,
            On => "Full power",
        }
        initial: Off
    }

    fn noop() -> Callback {
        Callback::new(Signature::new(), |_| Ok(Value::Null))
    }

    #[test]
    fn builder_validates_missing_target() {
        let err = EventBuilder::new("turn_on").from("Off").build().unwrap_err();
        assert_eq!(err.violations(), [Violation::MissingTarget("turn_on".into())]);
    }

    #[test]
    fn fluent_api_builds_event() {
        let event = EventBuilder::new("reset")
            .description("Back to the start")
            .from_any::<Light>()
            .from_initial()
            .to(Light::Off)
            .before(noop())
            .after(noop())
            .build()
            .unwrap();

        assert_eq!(event.description(), Some("Back to the start"));
        assert!(event.accepts(Some("Dimmed")));
        assert!(event.accepts(None));
        assert_eq!(event.target(), &Target::State("Off".into()));
        assert_eq!(event.get_actions(ActionType::Before).len(), 1);
        assert_eq!(event.get_actions(ActionType::After).len(), 1);
    }

    #[test]
    fn to_active_targets_the_placeholder() {
        let event = EventBuilder::new("refresh")
            .from(Light::On)
            .to_active()
            .transition_type(TransitionType::SelfTransition)
            .on(noop())
            .build()
            .unwrap();

        assert_eq!(event.target(), &Target::Active);
        assert_eq!(event.transition_type(), Some(TransitionType::SelfTransition));
        assert_eq!(event.get_actions(ActionType::On).len(), 1);
    }
}
