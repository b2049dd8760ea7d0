//! States and the enumerations that declare them.

use super::action::{Action, ActionList, ActionType, Callback};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

/// Trait for enumerations that declare the states of a machine.
///
/// The member name is the state name and the description is human readable.
/// At most one member may be declared initial. Usually implemented with the
/// [`state_enum!`](crate::state_enum) macro.
///
/// # Example
///
/// ```rust
/// use statewise::core::StateEnum;
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl StateEnum for Door {
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
///
///     fn description(&self) -> &'static str {
///         match self {
///             Self::Open => "The door is open",
///             Self::Closed => "The door is closed",
///         }
///     }
///
///     fn variants() -> &'static [Self] {
///         &[Self::Open, Self::Closed]
///     }
///
///     fn initial() -> Option<Self> {
///         Some(Self::Closed)
///     }
/// }
///
/// assert!(Door::Closed.is_initial());
/// ```
pub trait StateEnum: Copy + PartialEq + Debug + Send + Sync + 'static {
    /// Symbolic state name, unique within the enumeration.
    fn name(&self) -> &'static str;

    /// Human readable description.
    fn description(&self) -> &'static str;

    /// Every member, in declaration order.
    fn variants() -> &'static [Self];

    /// The member declared initial, if any.
    fn initial() -> Option<Self> {
        None
    }

    fn is_initial(&self) -> bool {
        Self::initial().is_some_and(|initial| initial == *self)
    }
}

/// A named state within a state machine.
///
/// Equality and hashing use the name only, so a state compares equal to its
/// name as `&str` or `String`.
#[derive(Clone, Serialize, Deserialize)]
pub struct State {
    name: String,
    description: Option<String>,
    #[serde(skip)]
    actions: ActionList,
}

impl State {
    /// Reserved name of the active-state placeholder.
    pub const ACTIVE: &'static str = "__active__";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            actions: ActionList::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Placeholder for "whatever the current state is at transition time".
    pub fn active() -> Self {
        Self::new(Self::ACTIVE).with_description("The active state at transition time.")
    }

    pub fn from_member<E: StateEnum>(member: E) -> Self {
        Self::new(member.name()).with_description(member.description())
    }

    /// One state per enumeration member, in declaration order.
    pub fn from_enum<E: StateEnum>() -> Vec<Self> {
        E::variants().iter().copied().map(Self::from_member).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active_placeholder(&self) -> bool {
        self.name == Self::ACTIVE
    }

    pub fn actions(&self) -> &[Action] {
        self.actions.all()
    }

    pub fn get_actions(&self, action_type: ActionType) -> Vec<Action> {
        self.actions.of(action_type)
    }

    /// Attach an entry or exit action.
    pub fn add_action(&mut self, callback: Callback, action_type: ActionType) -> Result<Action> {
        if !ActionType::STATE.contains(&action_type) {
            return Err(Error::InvalidActionType {
                owner: "state",
                action_type,
                allowed: ActionType::STATE,
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

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("actions", &self.actions.all().len())
            .finish()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for State {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialEq<str> for State {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for State {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl PartialEq<String> for State {
    fn eq(&self, other: &String) -> bool {
        &self.name == other
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Where an event leads: a named state or the active-state placeholder.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    State(String),
    Active,
}

impl Target {
    pub fn state(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    /// The named state, or `None` for the placeholder.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::State(name) => Some(name),
            Self::Active => None,
        }
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        if name == State::ACTIVE {
            Self::Active
        } else {
            Self::State(name)
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<&State> for Target {
    fn from(state: &State) -> Self {
        Self::from(state.name().to_string())
    }
}
