//! Actions: tagged callbacks attached to states and events.

use super::signature::{Params, Pool, Signature};
use crate::error::ActionError;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// What a callback returns. Only guard results are inspected, for truthiness.
pub type ActionResult = Result<Value, ActionError>;

type SyncFn = Arc<dyn Fn(Params) -> ActionResult + Send + Sync>;
type AsyncFn = Arc<dyn Fn(Params) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// The lifecycle phase an action runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Entry,
    Exit,
    Guard,
    Before,
    On,
    After,
}

impl ActionType {
    /// Types that may be attached to a state.
    pub const STATE: &'static [ActionType] = &[ActionType::Entry, ActionType::Exit];

    /// Types that may be attached to an event.
    pub const EVENT: &'static [ActionType] = &[
        ActionType::Guard,
        ActionType::Before,
        ActionType::On,
        ActionType::After,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::Guard => "guard",
            Self::Before => "before",
            Self::On => "on",
            Self::After => "after",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
enum Callable {
    Sync(SyncFn),
    Async(AsyncFn),
}

/// A callable paired with the signature it was declared with.
#[derive(Clone)]
pub struct Callback {
    signature: Signature,
    callable: Callable,
}

impl Callback {
    /// Wrap a synchronous callable; it runs inline when invoked.
    pub fn new<F>(signature: Signature, f: F) -> Self
    where
        F: Fn(Params) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            signature,
            callable: Callable::Sync(Arc::new(f)),
        }
    }

    /// Wrap a suspending callable; the returned future is awaited.
    pub fn new_async<F, Fut>(signature: Signature, f: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self {
            signature,
            callable: Callable::Async(Arc::new(move |params| f(params).boxed())),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn is_async(&self) -> bool {
        matches!(self.callable, Callable::Async(_))
    }

    /// Invoke with the parameters the signature accepts from `pool`.
    ///
    /// Failures are returned unchanged.
    pub async fn invoke(&self, pool: &Pool) -> ActionResult {
        let params = self.signature.bind(pool);
        match &self.callable {
            Callable::Sync(f) => f(params),
            Callable::Async(f) => f(params).await,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("signature", &self.signature)
            .field("async", &self.is_async())
            .finish()
    }
}

/// A callback tagged with the lifecycle phase it belongs to.
///
/// Cloning is cheap and clones compare equal: identity is the action id.
#[derive(Clone, Debug)]
pub struct Action {
    id: Uuid,
    action_type: ActionType,
    callback: Callback,
}

impl Action {
    pub fn new(action_type: ActionType, callback: Callback) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_type,
            callback,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn signature(&self) -> &Signature {
        self.callback.signature()
    }

    pub async fn call(&self, pool: &Pool) -> ActionResult {
        self.callback.invoke(pool).await
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Action {}

/// Run every action concurrently and wait for all of them.
///
/// Results keep the order of `actions`; completion order is unspecified.
pub(crate) async fn run_all(actions: &[Action], pool: &Pool) -> Vec<ActionResult> {
    futures::future::join_all(actions.iter().map(|action| action.call(pool))).await
}

/// Owner-side storage shared by states and events.
#[derive(Clone, Debug, Default)]
pub(crate) struct ActionList {
    actions: Vec<Action>,
}

impl ActionList {
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn all(&self) -> &[Action] {
        &self.actions
    }

    pub fn of(&self, action_type: ActionType) -> Vec<Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type() == action_type)
            .cloned()
            .collect()
    }

    pub fn remove(&mut self, action: &Action) -> Option<Action> {
        let index = self.actions.iter().position(|a| a == action)?;
        Some(self.actions.remove(index))
    }

    pub fn remove_type(&mut self, action_type: ActionType) -> usize {
        let before = self.actions.len();
        self.actions.retain(|a| a.action_type() != action_type);
        before - self.actions.len()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Arguments;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn sync_callback_receives_matched_params() {
        let callback = Callback::new(Signature::new().var_args(), |params| {
            Ok(json!(params.args.len()))
        });
        let pool = Arguments::new()
            .arg(json!(1))
            .arg(json!(2))
            .kwarg("k", json!(3))
            .into_pool();

        assert_eq!(callback.invoke(&pool).await.unwrap(), json!(2));
        assert!(!callback.is_async());
    }

    #[tokio::test]
    async fn async_callback_is_awaited() {
        let callback = Callback::new_async(Signature::new().keyword("k"), |params| async move {
            tokio::task::yield_now().await;
            Ok(params.kwarg("k").cloned().unwrap_or(Value::Null))
        });
        let pool = Arguments::new().kwarg("k", json!("v")).into_pool();

        assert_eq!(callback.invoke(&pool).await.unwrap(), json!("v"));
        assert!(callback.is_async());
    }

    #[tokio::test]
    async fn callback_failure_propagates_unchanged() {
        let callback = Callback::new(Signature::new(), |_| Err(ActionError::failed("boom")));
        let err = callback.invoke(&Pool::new()).await.unwrap_err();
        assert!(matches!(err, ActionError::Failed(msg) if msg == "boom"));
    }

    #[tokio::test]
    async fn run_all_invokes_every_action() {
        let count = Arc::new(AtomicUsize::new(0));
        let actions: Vec<Action> = (0..3)
            .map(|_| {
                let count = Arc::clone(&count);
                Action::new(
                    ActionType::On,
                    Callback::new(Signature::new(), move |_| {
                        count.fetch_add(1, Ordering::SeqCst);
                        Ok(Value::Null)
                    }),
                )
            })
            .collect();

        let results = run_all(&actions, &Pool::new()).await;
        assert_eq!(results.len(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn action_list_filters_and_removes() {
        let noop = || Callback::new(Signature::new(), |_| Ok(Value::Null));
        let mut list = ActionList::default();
        let entry = Action::new(ActionType::Entry, noop());
        list.push(entry.clone());
        list.push(Action::new(ActionType::Exit, noop()));
        list.push(Action::new(ActionType::Exit, noop()));

        assert_eq!(list.of(ActionType::Exit).len(), 2);
        assert_eq!(list.remove(&entry), Some(entry.clone()));
        assert_eq!(list.remove(&entry), None);
        assert_eq!(list.remove_type(ActionType::Exit), 2);
        assert!(list.all().is_empty());
    }
}
