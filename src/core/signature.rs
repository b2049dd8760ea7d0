//! Callback signatures and parameter matching.
//!
//! Callbacks attached to states and events do not share one shape: some want
//! only the transition, some want the transition plus the caller's
//! pass-through arguments, some want nothing at all. A [`Signature`] declares
//! what a callback accepts, and [`Signature::bind`] reduces a shared pool of
//! positional and keyword values to exactly that subset.

use crate::effects::Transition;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};

/// How a declared parameter can be satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

/// A single declared parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    fn is_receiver(&self) -> bool {
        matches!(self.name.as_str(), "self" | "cls")
    }
}

/// Ordered parameter list describing what a callback accepts.
///
/// Built once when a callback is registered, never per call.
///
/// # Example
///
/// ```rust
/// use statewise::core::{Arguments, Signature};
/// use serde_json::json;
///
/// let signature = Signature::new().param("amount").var_kwargs();
/// let arguments = Arguments::new().arg(json!(10)).kwarg("note", json!("tip"));
/// let params = signature.bind(&arguments.into_pool());
///
/// assert_eq!(params.arg(0), Some(&json!(10)));
/// assert_eq!(params.kwarg("note"), Some(&json!("tip")));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    /// A signature with no parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// The common shape of a callback that only wants the transition.
    pub fn transition() -> Self {
        Self::new().param("transition")
    }

    /// Accepts everything: all positional and all keyword values.
    pub fn variadic() -> Self {
        Self::new().var_args().var_kwargs()
    }

    pub fn with(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn positional(self, name: impl Into<String>) -> Self {
        self.with(Parameter::new(name, ParameterKind::PositionalOnly))
    }

    pub fn param(self, name: impl Into<String>) -> Self {
        self.with(Parameter::new(name, ParameterKind::PositionalOrKeyword))
    }

    pub fn var_args(self) -> Self {
        self.with(Parameter::new("args", ParameterKind::VarPositional))
    }

    pub fn keyword(self, name: impl Into<String>) -> Self {
        self.with(Parameter::new(name, ParameterKind::KeywordOnly))
    }

    pub fn var_kwargs(self) -> Self {
        self.with(Parameter::new("kwargs", ParameterKind::VarKeyword))
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Reduce `pool` to the values this signature can accept.
    ///
    /// Unmatched declared parameters are simply omitted and surplus supplied
    /// values are dropped; neither is an error. A positional-or-keyword
    /// parameter satisfied by keyword still consumes one queued positional.
    pub fn bind(&self, pool: &Pool) -> Params {
        let mut args: VecDeque<Arg> = pool.args.iter().cloned().collect();
        let mut kwargs = pool.kwargs.clone();
        let mut params = Params::default();

        for parameter in self.parameters.iter().filter(|p| !p.is_receiver()) {
            match parameter.kind {
                ParameterKind::PositionalOnly => {
                    if let Some(value) = args.pop_front() {
                        params.args.push(value);
                    }
                }
                ParameterKind::PositionalOrKeyword => {
                    if let Some(value) = kwargs.remove(&parameter.name) {
                        params.kwargs.insert(parameter.name.clone(), value);
                        args.pop_front();
                    } else if let Some(value) = args.pop_front() {
                        params.args.push(value);
                    }
                }
                ParameterKind::VarPositional => params.args.extend(args.drain(..)),
                ParameterKind::KeywordOnly => {
                    if let Some(value) = kwargs.remove(&parameter.name) {
                        params.kwargs.insert(parameter.name.clone(), value);
                    }
                }
                ParameterKind::VarKeyword => params.kwargs.append(&mut kwargs),
            }
        }

        tracing::trace!(
            declared = self.parameters.len(),
            matched_args = params.args.len(),
            matched_kwargs = params.kwargs.len(),
            "bound callback parameters"
        );
        params
    }
}

/// One value in an argument pool.
#[derive(Clone, Debug)]
pub enum Arg {
    Transition(Transition),
    Value(Value),
}

impl Arg {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Transition(_) => None,
        }
    }

    pub fn as_transition(&self) -> Option<&Transition> {
        match self {
            Self::Transition(transition) => Some(transition),
            Self::Value(_) => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Transition> for Arg {
    fn from(transition: Transition) -> Self {
        Self::Transition(transition)
    }
}

/// The positional and keyword values offered to a callback.
#[derive(Clone, Debug, Default)]
pub struct Pool {
    pub args: Vec<Arg>,
    pub kwargs: BTreeMap<String, Arg>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Arg>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }
}

/// The subset of a [`Pool`] a callback declared, as handed to it.
#[derive(Clone, Debug, Default)]
pub struct Params {
    pub args: Vec<Arg>,
    pub kwargs: BTreeMap<String, Arg>,
}

impl Params {
    /// The transition, whether it was matched by keyword or by position.
    pub fn transition(&self) -> Option<&Transition> {
        self.kwargs
            .get("transition")
            .and_then(Arg::as_transition)
            .or_else(|| self.args.iter().find_map(Arg::as_transition))
    }

    /// The `index`-th positional JSON value, skipping transition handles.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.iter().filter_map(Arg::as_value).nth(index)
    }

    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name).and_then(Arg::as_value)
    }

    pub fn len(&self) -> usize {
        self.args.len() + self.kwargs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

/// Caller-supplied pass-through arguments for `trigger` and `enter_state`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Arguments {
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    /// The pool of plain values, with no transition attached.
    pub fn into_pool(self) -> Pool {
        Pool {
            args: self.args.into_iter().map(Arg::Value).collect(),
            kwargs: self
                .kwargs
                .into_iter()
                .map(|(name, value)| (name, Arg::Value(value)))
                .collect(),
        }
    }

    /// The pool handed to state and event actions: the caller's values with
    /// the running transition under the `transition` keyword.
    pub(crate) fn action_pool(&self, transition: &Transition) -> Pool {
        let mut pool = self.clone().into_pool();
        pool.kwargs
            .insert("transition".to_string(), Arg::Transition(transition.clone()));
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool() -> Pool {
        Arguments::new()
            .arg(json!(1))
            .arg(json!(2))
            .arg(json!(3))
            .kwarg("a", json!("x"))
            .kwarg("b", json!("y"))
            .into_pool()
    }

    fn values(args: &[Arg]) -> Vec<Value> {
        args.iter().filter_map(|a| a.as_value().cloned()).collect()
    }

    #[test]
    fn empty_signature_receives_nothing() {
        let params = Signature::new().bind(&pool());
        assert!(params.is_empty());
    }

    #[test]
    fn positional_only_consumes_from_front() {
        let params = Signature::new()
            .positional("first")
            .positional("second")
            .bind(&pool());

        assert_eq!(values(&params.args), vec![json!(1), json!(2)]);
        assert!(params.kwargs.is_empty());
    }

    #[test]
    fn unmatched_positional_parameters_are_omitted() {
        let arguments = Arguments::new().arg(json!("only"));
        let params = Signature::new()
            .positional("a")
            .positional("b")
            .positional("c")
            .bind(&arguments.into_pool());

        assert_eq!(values(&params.args), vec![json!("only")]);
    }

    #[test]
    fn keyword_match_still_consumes_a_positional() {
        let params = Signature::new().param("a").var_args().bind(&pool());

        assert_eq!(params.kwarg("a"), Some(&json!("x")));
        assert_eq!(values(&params.args), vec![json!(2), json!(3)]);
    }

    #[test]
    fn positional_or_keyword_falls_back_to_positional() {
        let params = Signature::new().param("missing").bind(&pool());

        assert_eq!(values(&params.args), vec![json!(1)]);
        assert!(params.kwargs.is_empty());
    }

    #[test]
    fn var_positional_takes_everything_remaining() {
        let params = Signature::new()
            .positional("head")
            .var_args()
            .bind(&pool());

        assert_eq!(values(&params.args), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn keyword_only_matches_by_name() {
        let params = Signature::new().keyword("b").keyword("zzz").bind(&pool());

        assert_eq!(params.kwargs.len(), 1);
        assert_eq!(params.kwarg("b"), Some(&json!("y")));
        assert!(params.args.is_empty());
    }

    #[test]
    fn var_keyword_takes_remaining_keywords() {
        let params = Signature::new().keyword("a").var_kwargs().bind(&pool());

        assert_eq!(params.kwargs.len(), 2);
        assert_eq!(params.kwarg("a"), Some(&json!("x")));
        assert_eq!(params.kwarg("b"), Some(&json!("y")));
    }

    #[test]
    fn receiver_parameters_are_ignored() {
        let params = Signature::new()
            .positional("self")
            .positional("value")
            .bind(&pool());

        assert_eq!(values(&params.args), vec![json!(1)]);
    }

    #[test]
    fn bind_does_not_mutate_the_pool() {
        let pool = pool();
        let _ = Signature::variadic().bind(&pool);
        assert_eq!(pool.args.len(), 3);
        assert_eq!(pool.kwargs.len(), 2);
    }

    #[test]
    fn params_arg_skips_transition_handles() {
        let params = Params {
            args: vec![Arg::Value(json!("a")), Arg::Value(json!("b"))],
            kwargs: BTreeMap::new(),
        };
        assert_eq!(params.arg(1), Some(&json!("b")));
        assert!(params.transition().is_none());
    }
}
