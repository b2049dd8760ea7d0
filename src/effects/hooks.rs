//! Machine-wide transition hooks.

use crate::core::Arguments;
use crate::effects::transition::Transition;
use crate::error::ActionError;
use async_trait::async_trait;

/// Callbacks a state machine runs around every transition.
///
/// Each hook sees the transition being executed and the arguments passed to
/// `trigger`/`enter_state`. `guard_transition` runs first and may cancel by
/// returning `Ok(false)` or [`ActionError::Rejected`]; the others run at the
/// start of the before, mutation and after phases respectively.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use statewise::{ActionError, Arguments, Hooks, Transition};
///
/// struct OnlyWhenArmed {
///     armed: bool,
/// }
///
/// #[async_trait]
/// impl Hooks for OnlyWhenArmed {
///     async fn guard_transition(
///         &mut self,
///         _transition: &Transition,
///         _arguments: &Arguments,
///     ) -> Result<bool, ActionError> {
///         Ok(self.armed)
///     }
/// }
/// ```
#[async_trait]
pub trait Hooks: Send + Sync {
    async fn guard_transition(
        &mut self,
        _transition: &Transition,
        _arguments: &Arguments,
    ) -> Result<bool, ActionError> {
        Ok(true)
    }

    async fn before_transition(
        &mut self,
        _transition: &Transition,
        _arguments: &Arguments,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    async fn on_transition(
        &mut self,
        _transition: &Transition,
        _arguments: &Arguments,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    async fn after_transition(
        &mut self,
        _transition: &Transition,
        _arguments: &Arguments,
    ) -> Result<(), ActionError> {
        Ok(())
    }
}

/// Hooks that allow every transition and do nothing else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoHooks;

impl Hooks for NoHooks {}
