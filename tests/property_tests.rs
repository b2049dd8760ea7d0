//! Property-based tests for parameter matching, guards and transitions.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use serde_json::{json, Value};
use statewise::core::{combine_guards, is_truthy, Arg, Pool, Signature};
use statewise::{state_enum, Event, History, State, StateMachine, TransitionType};

state_enum! {
    enum TestState {
        Initial,
        Processing,
        Complete,
        Failed,
    }
    initial: Initial
}

prop_compose! {
    fn arbitrary_state()(variant in 0..4u8) -> TestState {
        match variant {
            0 => TestState::Initial,
            1 => TestState::Processing,
            2 => TestState::Complete,
            _ => TestState::Failed,
        }
    }
}

fn arbitrary_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

prop_compose! {
    fn arbitrary_pool()(
        args in prop::collection::vec(arbitrary_value(), 0..6),
        kwargs in prop::collection::btree_map("[a-z]{1,6}", arbitrary_value(), 0..6),
    ) -> Pool {
        let mut pool = Pool::new();
        for value in args {
            pool = pool.arg(value);
        }
        for (name, value) in kwargs {
            pool = pool.kwarg(name, value);
        }
        pool
    }
}

fn values(args: &[Arg]) -> Vec<Value> {
    args.iter().filter_map(Arg::as_value).cloned().collect()
}

/// A ring of states where `next_<i>` advances from the i-th state to the one after it.
fn ring() -> StateMachine<History> {
    let mut machine = StateMachine::with_hooks(History::new());
    machine.add_states(State::from_enum::<TestState>()).unwrap();
    let order = [
        TestState::Initial,
        TestState::Processing,
        TestState::Complete,
        TestState::Failed,
    ];
    for (index, from) in order.iter().enumerate() {
        let to = order[(index + 1) % order.len()];
        machine
            .add_event(Event::new(format!("next_{}", index), to.as_ref()).from(from))
            .unwrap();
    }
    machine
}

proptest! {
    #[test]
    fn zero_parameter_signature_receives_nothing(pool in arbitrary_pool()) {
        let params = Signature::new().bind(&pool);
        prop_assert!(params.is_empty());
    }

    #[test]
    fn variadic_positional_receives_every_value_in_order(pool in arbitrary_pool()) {
        let params = Signature::new().var_args().bind(&pool);
        prop_assert_eq!(values(&params.args), values(&pool.args));
        prop_assert!(params.kwargs.is_empty());
    }

    #[test]
    fn variadic_signature_receives_the_whole_pool(pool in arbitrary_pool()) {
        let params = Signature::variadic().bind(&pool);
        prop_assert_eq!(params.args.len(), pool.args.len());
        prop_assert_eq!(
            params.kwargs.keys().collect::<Vec<_>>(),
            pool.kwargs.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn keyword_match_consumes_one_positional(
        pool in arbitrary_pool(),
        value in arbitrary_value(),
    ) {
        let pool = pool.kwarg("amount", value.clone());
        let params = Signature::new().param("amount").var_args().bind(&pool);

        prop_assert_eq!(params.kwarg("amount"), Some(&value));
        let rest: Vec<Value> = values(&pool.args).into_iter().skip(1).collect();
        prop_assert_eq!(values(&params.args), rest);
    }

    #[test]
    fn matched_names_are_always_declared(pool in arbitrary_pool()) {
        let signature = Signature::new().param("a").keyword("b").positional("c");
        let params = signature.bind(&pool);

        prop_assert!(params.kwargs.keys().all(|name| name == "a" || name == "b"));
        prop_assert!(params.args.len() <= 2);
    }

    #[test]
    fn guards_combine_with_logical_and(
        outcomes in prop::collection::vec(arbitrary_value(), 0..8),
    ) {
        let expected = outcomes.iter().all(is_truthy);
        let verdict = combine_guards(outcomes.into_iter().map(Ok)).unwrap();
        prop_assert_eq!(verdict.is_allowed(), expected);
    }

    #[test]
    fn transition_type_constrains_source_and_target(
        source in arbitrary_state(),
        target in arbitrary_state(),
        kind in prop_oneof![
            Just(TransitionType::External),
            Just(TransitionType::Internal),
            Just(TransitionType::SelfTransition),
        ],
    ) {
        let mut machine = StateMachine::new();
        machine.add_states(State::from_enum::<TestState>()).unwrap();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(async {
            machine.enter_state(source).await.unwrap();
            machine
                .enter_state_with(target, Default::default(), Some(kind))
                .await
        });

        let same = source == target;
        let valid = match kind {
            TransitionType::External => !same,
            TransitionType::Internal | TransitionType::SelfTransition => same,
        };
        prop_assert_eq!(result.is_ok(), valid);
        let expected = if valid { target } else { source };
        prop_assert!(*machine.state().unwrap() == expected);
    }

    #[test]
    fn history_preserves_order(steps in 1..20usize) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut machine = ring();

        runtime.block_on(async {
            machine.enter_state(TestState::Initial).await.unwrap();
            for step in 0..steps {
                let event = format!("next_{}", step % 4);
                assert!(machine.trigger(event).await.unwrap());
            }
        });

        let history = machine.hooks();
        prop_assert_eq!(history.len(), steps + 1);

        let names = ["Initial", "Processing", "Complete", "Failed"];
        let expected: Vec<&str> = (0..=steps).map(|step| names[step % 4]).collect();
        prop_assert_eq!(history.path(), expected);

        for window in history.transitions().windows(2) {
            prop_assert!(window[0].finished_at() <= window[1].started_at());
        }
    }

    #[test]
    fn active_target_never_changes_state(state in arbitrary_state(), times in 1..5usize) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut machine = StateMachine::new();
        machine.add_states(State::from_enum::<TestState>()).unwrap();
        machine
            .add_event(
                Event::new("poll", statewise::Target::Active)
                    .from(TestState::Initial)
                    .from(TestState::Processing)
                    .from(TestState::Complete)
                    .from(TestState::Failed)
                    .with_transition_type(TransitionType::Internal),
            )
            .unwrap();

        runtime.block_on(async {
            machine.enter_state(state).await.unwrap();
            for _ in 0..times {
                assert!(machine.trigger("poll").await.unwrap());
            }
        });

        prop_assert!(*machine.state().unwrap() == state);
        prop_assert_eq!(json!(machine.state().unwrap().name()), json!(state.as_ref()));
    }
}
