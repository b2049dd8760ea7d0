//! The transition engine: one ordered, single-use state change.

use crate::core::{
    combine_guards, hook_verdict, run_all, Action, ActionResult, ActionType, Arguments, Event,
    Pool, State, TransitionType, Verdict,
};
use crate::effects::hooks::Hooks;
use crate::effects::machine::{CurrentState, StateMachine};
use crate::error::{ActionError, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// A single change of state within a state machine.
///
/// Created once per `trigger`/`enter_state` call and executed at most once.
/// The handle is cheap to clone and every clone observes the same record, so
/// a copy kept in a history log sees the timestamps of the run that produced
/// it.
///
/// Execution runs these phases in order:
/// 1. guard: the `guard_transition` hook, then the event's guard actions
/// 2. before: the `before_transition` hook, then before actions
/// 3. mutation: source exit actions, the current-state change,
///    `on_transition` and on actions, then target entry actions
/// 4. after: after actions, then the `after_transition` hook
///
/// Actions of one phase run concurrently. A failing guard cancels the
/// transition; a failure during mutation restores the source state before
/// propagating.
#[derive(Clone)]
pub struct Transition {
    inner: Arc<Inner>,
}

struct Inner {
    id: Uuid,
    machine_id: Uuid,
    current: CurrentState,
    source: Option<State>,
    target: State,
    event: Option<Event>,
    transition_type: TransitionType,
    created_at: DateTime<Utc>,
    started_at: OnceLock<DateTime<Utc>>,
    finished_at: OnceLock<DateTime<Utc>>,
    cancelled: OnceLock<bool>,
    arguments: OnceLock<Arguments>,
}

/// Stamps `finished_at` however execution ends, including a dropped future.
struct Lifecycle<'a>(&'a Inner);

impl Drop for Lifecycle<'_> {
    fn drop(&mut self) {
        let _ = self.0.finished_at.set(Utc::now());
    }
}

impl Transition {
    /// Prepare a transition of `machine` from `source` to `target`.
    ///
    /// Without an explicit type the event's default is used, falling back to
    /// external. Internal and self transitions need `source == target`;
    /// external ones need them to differ.
    pub fn new<H: Hooks>(
        machine: &StateMachine<H>,
        source: Option<State>,
        target: State,
        event: Option<Event>,
        transition_type: Option<TransitionType>,
    ) -> Result<Self> {
        let transition_type = transition_type
            .or_else(|| event.as_ref().and_then(Event::transition_type))
            .unwrap_or(TransitionType::External);

        let same_state = source.as_ref().is_some_and(|source| *source == target);
        match transition_type {
            TransitionType::Internal | TransitionType::SelfTransition if !same_state => {
                return Err(Error::InvalidTransition {
                    transition_type,
                    reason: "source and target states must be the same for internal or self transitions",
                });
            }
            TransitionType::External if same_state => {
                return Err(Error::InvalidTransition {
                    transition_type,
                    reason: "source and target states cannot be the same for external transitions",
                });
            }
            _ => {}
        }

        Ok(Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                machine_id: machine.id(),
                current: machine.current.clone(),
                source,
                target,
                event,
                transition_type,
                created_at: Utc::now(),
                started_at: OnceLock::new(),
                finished_at: OnceLock::new(),
                cancelled: OnceLock::new(),
                arguments: OnceLock::new(),
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The state the machine was in, `None` for an initial transition.
    pub fn source(&self) -> Option<&State> {
        self.inner.source.as_ref()
    }

    pub fn target(&self) -> &State {
        &self.inner.target
    }

    /// The triggering event, `None` when a state was entered directly.
    pub fn event(&self) -> Option<&Event> {
        self.inner.event.as_ref()
    }

    pub fn transition_type(&self) -> TransitionType {
        self.inner.transition_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.inner.started_at.get().copied()
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.inner.finished_at.get().copied()
    }

    /// Whether a guard cancelled the run; `None` until the guard phase ends.
    pub fn cancelled(&self) -> Option<bool> {
        self.inner.cancelled.get().copied()
    }

    /// The pass-through arguments of the run, once started.
    pub fn arguments(&self) -> Option<&Arguments> {
        self.inner.arguments.get()
    }

    /// The current state of the owning machine, read live.
    ///
    /// Before and guard actions see the source; on and entry actions
    /// already see the target.
    pub fn machine_state(&self) -> Option<String> {
        self.inner.current.get()
    }

    pub fn is_executing(&self) -> bool {
        self.started_at().is_some() && self.finished_at().is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.started_at().is_some() && self.finished_at().is_some()
    }

    /// How long execution took, once finished.
    pub fn runtime(&self) -> Option<Duration> {
        let (started, finished) = (self.started_at()?, self.finished_at()?);
        finished.signed_duration_since(started).to_std().ok()
    }

    /// A serializable copy of the record.
    pub fn snapshot(&self) -> TransitionSnapshot {
        TransitionSnapshot {
            id: self.id(),
            source: self.source().map(|s| s.name().to_string()),
            target: self.target().name().to_string(),
            event: self.event().map(|e| e.name().to_string()),
            transition_type: self.transition_type(),
            created_at: self.created_at(),
            started_at: self.started_at(),
            finished_at: self.finished_at(),
            cancelled: self.cancelled(),
            arguments: self.arguments().cloned(),
        }
    }

    /// Run the transition against the machine that created it.
    ///
    /// Returns `Ok(false)` when a guard cancels. Any other failure is
    /// returned unchanged. Executing twice is an error, as is a target that
    /// is not registered or a source that is no longer the current state.
    pub async fn execute<H: Hooks>(
        &self,
        machine: &mut StateMachine<H>,
        arguments: Arguments,
    ) -> Result<bool> {
        if machine.id() != self.inner.machine_id {
            return Err(Error::ForeignTransition { id: self.id() });
        }
        if self.started_at().is_some() {
            return Err(Error::AlreadyExecuted { id: self.id() });
        }
        machine.require_state(self.target().name())?;
        let source = self.source().map(State::name);
        if !machine.current.is(source) {
            return Err(Error::SourceMismatch {
                id: self.id(),
                expected: source.map(str::to_string),
                current: machine.current.get(),
            });
        }
        if self.inner.started_at.set(Utc::now()).is_err() {
            return Err(Error::AlreadyExecuted { id: self.id() });
        }
        let _lifecycle = Lifecycle(&self.inner);
        let arguments = self.inner.arguments.get_or_init(|| arguments);

        let span = tracing::debug_span!(
            "transition",
            id = %self.id(),
            event = self.event().map(Event::name),
            source = self.source().map(State::name),
            target = %self.target(),
            kind = ?self.transition_type(),
        );
        self.run(machine, arguments).instrument(span).await
    }

    async fn run<H: Hooks>(
        &self,
        machine: &mut StateMachine<H>,
        arguments: &Arguments,
    ) -> Result<bool> {
        let pool = arguments.action_pool(self);

        let verdict = match self.guard(machine, arguments, &pool).await {
            Ok(verdict) => verdict,
            Err(err) => {
                self.mark_cancelled(false);
                return Err(err.into());
            }
        };
        if let Verdict::Cancel(reason) = verdict {
            self.mark_cancelled(true);
            tracing::debug!(%reason, "transition cancelled");
            return Ok(false);
        }
        self.mark_cancelled(false);

        tracing::debug!("before phase");
        machine.hooks.before_transition(self, arguments).await?;
        settle(run_all(&self.event_actions(ActionType::Before), &pool).await)?;

        tracing::debug!("mutation phase");
        if let Err(err) = self.mutate(machine, arguments, &pool).await {
            machine.current.set(self.source().map(State::name));
            tracing::warn!(error = %err, "transition failed, current state restored to source");
            return Err(err);
        }

        tracing::debug!("after phase");
        settle(run_all(&self.event_actions(ActionType::After), &pool).await)?;
        machine.hooks.after_transition(self, arguments).await?;

        tracing::info!("transition complete");
        Ok(true)
    }

    async fn guard<H: Hooks>(
        &self,
        machine: &mut StateMachine<H>,
        arguments: &Arguments,
        pool: &Pool,
    ) -> std::result::Result<Verdict, ActionError> {
        tracing::debug!("guard phase");
        let verdict = hook_verdict(machine.hooks.guard_transition(self, arguments).await)?;
        if !verdict.is_allowed() {
            return Ok(verdict);
        }
        combine_guards(run_all(&self.event_actions(ActionType::Guard), pool).await)
    }

    async fn mutate<H: Hooks>(
        &self,
        machine: &mut StateMachine<H>,
        arguments: &Arguments,
        pool: &Pool,
    ) -> Result<()> {
        let reenters = self.transition_type().reenters();

        if reenters {
            if let Some(source) = self.source() {
                settle(run_all(&source.get_actions(ActionType::Exit), pool).await)?;
            }
        }

        machine.current.set(Some(self.target().name()));
        machine.hooks.on_transition(self, arguments).await?;
        settle(run_all(&self.event_actions(ActionType::On), pool).await)?;

        if reenters {
            settle(run_all(&self.target().get_actions(ActionType::Entry), pool).await)?;
        }
        Ok(())
    }

    fn mark_cancelled(&self, cancelled: bool) {
        let first = self.inner.cancelled.set(cancelled).is_ok();
        debug_assert!(first, "cancelled is written once per run");
    }

    fn event_actions(&self, action_type: ActionType) -> Vec<Action> {
        self.event()
            .map(|event| event.get_actions(action_type))
            .unwrap_or_default()
    }
}

/// The first failure of a joined phase, in action order.
fn settle(results: Vec<ActionResult>) -> std::result::Result<(), ActionError> {
    results.into_iter().try_for_each(|result| result.map(|_| ()))
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("id", &self.id())
            .field("source", &self.source().map(State::name))
            .field("target", &self.target().name())
            .field("event", &self.event().map(Event::name))
            .field("type", &self.transition_type())
            .field("started_at", &self.started_at())
            .field("finished_at", &self.finished_at())
            .field("cancelled", &self.cancelled())
            .finish()
    }
}

/// Serializable record of a transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionSnapshot {
    pub id: Uuid,
    pub source: Option<String>,
    pub target: String,
    pub event: Option<String>,
    pub transition_type: TransitionType,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub cancelled: Option<bool>,
    pub arguments: Option<Arguments>,
}
