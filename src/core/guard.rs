//! Guard verdicts.
//!
//! Guard actions return a JSON value; the phase passes only when every value
//! is truthy. A [`ActionError::Rejected`] from any guard is a cancellation,
//! not a failure.

use super::action::ActionResult;
use crate::error::ActionError;
use serde_json::Value;

/// Outcome of a guard phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Cancel(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
///
/// # Example
///
/// ```rust
/// use statewise::core::is_truthy;
/// use serde_json::json;
///
/// assert!(is_truthy(&json!(true)));
/// assert!(is_truthy(&json!("yes")));
/// assert!(!is_truthy(&json!(null)));
/// assert!(!is_truthy(&json!(0)));
/// ```
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Combine guard action results with logical AND.
///
/// No results means allow. The first error in action order decides: a
/// rejection cancels, anything else is returned for the caller to propagate.
pub fn combine<I>(results: I) -> Result<Verdict, ActionError>
where
    I: IntoIterator<Item = ActionResult>,
{
    let mut verdict = Verdict::Allow;
    for result in results {
        match result {
            Ok(value) if !is_truthy(&value) && verdict.is_allowed() => {
                verdict = Verdict::Cancel("transition cancelled by guard action".to_string());
            }
            Ok(_) => {}
            Err(ActionError::Rejected(reason)) => return Ok(Verdict::Cancel(reason)),
            Err(err) => return Err(err),
        }
    }
    Ok(verdict)
}

/// Interpret the machine-wide guard hook's answer.
pub fn from_hook(result: Result<bool, ActionError>) -> Result<Verdict, ActionError> {
    match result {
        Ok(true) => Ok(Verdict::Allow),
        Ok(false) => Ok(Verdict::Cancel(
            "transition cancelled by guard_transition callback".to_string(),
        )),
        Err(ActionError::Rejected(reason)) => Ok(Verdict::Cancel(reason)),
        Err(err) => Err(err),
    }
}
