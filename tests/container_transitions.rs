mod common;

use common::{counter, record_counts, Counter};
use serde_json::json;
use state_containers::{Action, Container, ContainerError, PureTransitions, SET_ACTION_TYPE};
use std::sync::Arc;

#[test]
fn default_state_is_initial_state() {
    let container = counter(3);
    assert_eq!(*container.get(), Counter { count: 3 });
    assert!(Arc::ptr_eq(&container.get(), &container.get_state()));
}

#[test]
fn transition_updates_state_and_selector() {
    let container = counter(0);
    let seen = record_counts(&container);

    container.transitions().call("increment", (5,)).unwrap();

    assert_eq!(container.get().count, 5);
    assert_eq!(container.selectors().call::<i64, _>("getCount", ()).unwrap(), 5);
    assert_eq!(*seen.borrow(), vec![5]);
}

#[test]
fn set_replaces_whole_state() {
    let container = counter(1);
    let seen = record_counts(&container);

    container.set(Counter { count: 10 }).unwrap();

    assert_eq!(container.get().count, 10);
    assert_eq!(*seen.borrow(), vec![10]);
}

#[test]
fn set_is_a_dispatch_of_the_reserved_action() {
    let container = counter(1);
    container.dispatch(Action::set(Counter { count: 4 })).unwrap();

    assert_eq!(Action::set(Counter { count: 4 }).kind(), SET_ACTION_TYPE);
    assert_eq!(container.get().count, 4);
}

#[test]
fn unknown_action_keeps_same_state_and_still_notifies() {
    let container = counter(2);
    let seen = record_counts(&container);
    let before = container.get();

    container.dispatch(Action::new("unknown", vec![])).unwrap();

    assert!(Arc::ptr_eq(&before, &container.get()));
    assert_eq!(*seen.borrow(), vec![2]);
}

#[test]
fn selectors_are_pure() {
    let container = counter(7);
    let before = container.get();

    let above: bool = container.selectors().call("isAbove", (5,)).unwrap();
    let again: bool = container.selectors().call("isAbove", (5,)).unwrap();

    assert!(above);
    assert_eq!(above, again);
    assert!(Arc::ptr_eq(&before, &container.get()));
}

#[test]
fn select_reads_current_state() {
    let container = counter(4);
    assert_eq!(container.select(|state| state.count * 2), 8);
}

#[test]
fn invalid_arguments_are_rejected() {
    let container = counter(0);
    let seen = record_counts(&container);

    let wrong_type = container.dispatch(Action::new("increment", vec![json!("five")]));
    let wrong_arity = container.dispatch(Action::new("increment", vec![json!(1), json!(2)]));

    assert!(matches!(
        wrong_type,
        Err(ContainerError::InvalidArgs { ref name, .. }) if name == "increment"
    ));
    assert!(matches!(wrong_arity, Err(ContainerError::InvalidArgs { .. })));
    assert_eq!(container.get().count, 0);
    assert!(seen.borrow().is_empty());
}

#[test]
fn failed_transition_leaves_state_and_subscribers_untouched() {
    let container = counter(3);
    let seen = record_counts(&container);
    let before = container.get();

    let err = container.transitions().call("withdraw", (10,)).unwrap_err();

    assert_eq!(err.to_string(), "transition 'withdraw' failed: insufficient funds");
    assert!(Arc::ptr_eq(&before, &container.get()));
    assert!(seen.borrow().is_empty());

    container.transitions().call("withdraw", (2,)).unwrap();
    assert_eq!(container.get().count, 1);
}

#[test]
fn unknown_transition_or_selector_name_is_an_error() {
    let container = counter(0);

    assert!(matches!(
        container.transitions().call("explode", ()),
        Err(ContainerError::UnknownTransition(ref name)) if name == "explode"
    ));
    assert!(matches!(
        container.selectors().call::<i64, _>("missing", ()),
        Err(ContainerError::UnknownSelector(_))
    ));
}

#[test]
fn selector_output_type_is_checked() {
    let container = counter(0);
    let result = container.selectors().call::<String, _>("getCount", ());
    assert!(matches!(result, Err(ContainerError::SelectorOutput { .. })));
}

#[test]
fn registries_list_names_in_order() {
    let container = counter(0);
    let transitions: Vec<&str> = container.transitions().names().collect();
    let selectors: Vec<&str> = container.selectors().names().collect();

    assert_eq!(transitions, vec!["increment", "reset", "withdraw"]);
    assert_eq!(selectors, vec!["getCount", "isAbove"]);
    assert!(container.transitions().contains("reset"));
}

#[test]
fn duplicate_and_reserved_names_fail_to_build() {
    let duplicate = Container::builder(0_i64)
        .transitions(
            PureTransitions::new()
                .with("add", |s: &i64, (by,): (i64,)| s + by)
                .with("add", |s: &i64, (by,): (i64,)| s + by * 2),
        )
        .build();
    assert!(matches!(duplicate, Err(ContainerError::DuplicateName { .. })));

    let reserved = Container::builder(0_i64)
        .transitions(PureTransitions::new().with(SET_ACTION_TYPE, |_: &i64, (v,): (i64,)| v))
        .build();
    assert!(matches!(reserved, Err(ContainerError::ReservedName(_))));
}

#[test]
fn container_without_registries_supports_get_and_set() {
    let container = Container::new(vec![1, 2]);
    container.set(vec![3]).unwrap();

    assert_eq!(*container.get(), vec![3]);
    assert!(container.transitions().is_empty());
    assert!(container.selectors().is_empty());
}

#[test]
fn clones_share_state() {
    let container = counter(0);
    let handle = container.clone();

    handle.transitions().call("increment", (2,)).unwrap();
    assert_eq!(container.get().count, 2);
}

#[test]
fn non_finite_float_args_are_rejected_before_dispatch() {
    let container = Container::builder(1.0_f64)
        .transitions(PureTransitions::new().with("scale", |state: &f64, (by,): (f64,)| state * by))
        .build()
        .unwrap();

    let result = container.transitions().call("scale", (f64::INFINITY,));
    assert!(matches!(result, Err(ContainerError::ArgsEncoding(_))));
    assert!(Action::<f64>::with_args("scale", (f64::NAN,)).is_err());

    container.transitions().call("scale", (2.5,)).unwrap();
    assert_eq!(*container.get(), 2.5);
}
