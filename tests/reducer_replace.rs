mod common;

use common::{counter, record_counts, Counter};
use state_containers::{reducer_fn, Action, ContainerError, Reducer};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[test]
fn replaced_reducer_wraps_previous_one() {
    let container = counter(1);
    let seen = record_counts(&container);
    let kinds = Rc::new(RefCell::new(Vec::new()));

    let previous = container.reducer();
    let log = Rc::clone(&kinds);
    container.replace_reducer(reducer_fn(
        move |state: &Arc<Counter>, action: Action<Counter>| {
            log.borrow_mut().push(action.kind().to_string());
            previous.reduce(state, action)
        },
    ));

    assert_eq!(container.get().count, 1);
    container.transitions().call("increment", (4,)).unwrap();

    assert_eq!(container.get().count, 5);
    assert_eq!(*kinds.borrow(), vec!["increment"]);
    assert_eq!(*seen.borrow(), vec![5]);
}

#[test]
fn replaced_reducer_can_handle_new_actions() {
    let container = counter(3);
    let previous = container.reducer();
    let handle = container.clone();
    container.replace_reducer(reducer_fn(
        move |state: &Arc<Counter>, action: Action<Counter>| {
            if action.kind() == "double" {
                return Ok(handle.freeze(Counter {
                    count: state.count * 2,
                }));
            }
            previous.reduce(state, action)
        },
    ));

    container.dispatch(Action::new("double", vec![])).unwrap();
    assert_eq!(container.get().count, 6);
    assert!(container.verify().is_ok());
}

#[test]
fn reducer_errors_leave_state_untouched() {
    let container = counter(2);
    let seen = record_counts(&container);
    container.replace_reducer(reducer_fn(
        |_: &Arc<Counter>, action: Action<Counter>| -> state_containers::Result<Arc<Counter>> {
            Err(ContainerError::UnknownTransition(action.kind().to_string()))
        },
    ));

    assert!(container.set(Counter { count: 9 }).is_err());
    assert_eq!(container.get().count, 2);
    assert!(seen.borrow().is_empty());
}
