mod common;

use common::{counter, counter_selectors, counter_transitions, record_counts, Counter};
use state_containers::middleware::from_fn;
use state_containers::{
    Action, Container, ContainerError, LoggingMiddleware, Middleware, Next, RecordingMiddleware,
    Result, SET_ACTION_TYPE,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Appends its label to a shared log, then forwards.
struct Tag {
    label: &'static str,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Middleware<Counter> for Tag {
    fn handle(
        &self,
        _container: &Container<Counter>,
        action: Action<Counter>,
        next: &Next<'_, Counter>,
    ) -> Result<()> {
        self.log.borrow_mut().push(self.label);
        next.run(action)
    }
}

#[test]
fn last_added_middleware_runs_first() {
    let container = counter(0);
    let log = Rc::new(RefCell::new(Vec::new()));

    container.add_middleware(Tag {
        label: "m1",
        log: Rc::clone(&log),
    });
    container.add_middleware(Tag {
        label: "m2",
        log: Rc::clone(&log),
    });
    container.transitions().call("increment", (1,)).unwrap();

    assert_eq!(*log.borrow(), vec!["m2", "m1"]);
    assert_eq!(container.get().count, 1);
    assert_eq!(container.middleware_count(), 2);
}

#[test]
fn middleware_that_does_not_forward_blocks_inner_chain() {
    let container = counter(0);
    let seen = record_counts(&container);
    let log = Rc::new(RefCell::new(Vec::new()));

    container.add_middleware(Tag {
        label: "m1",
        log: Rc::clone(&log),
    });
    container.add_middleware(from_fn(
        |_: &Container<Counter>, action: Action<Counter>, next: &Next<'_, Counter>| {
            if action.kind() == "increment" {
                return Ok(());
            }
            next.run(action)
        },
    ));

    container.transitions().call("increment", (1,)).unwrap();
    assert!(log.borrow().is_empty());
    assert_eq!(container.get().count, 0);
    assert!(seen.borrow().is_empty());

    container.set(Counter { count: 5 }).unwrap();
    assert_eq!(*log.borrow(), vec!["m1"]);
    assert_eq!(*seen.borrow(), vec![5]);
}

#[test]
fn middleware_can_rewrite_and_fan_out_actions() {
    let container = counter(0);
    container.add_middleware(from_fn(
        |_: &Container<Counter>, action: Action<Counter>, next: &Next<'_, Counter>| {
            if action.kind() == "double" {
                next.run(Action::with_args("increment", (1,))?)?;
                return next.run(Action::with_args("increment", (1,))?);
            }
            next.run(action)
        },
    ));

    container.dispatch(Action::new("double", vec![])).unwrap();
    assert_eq!(container.get().count, 2);
}

#[test]
fn middleware_errors_reach_the_caller() {
    let container = counter(0);
    container.add_middleware(from_fn(
        |_: &Container<Counter>, _: Action<Counter>, _: &Next<'_, Counter>| {
            Err(ContainerError::Config("read-only".to_string()))
        },
    ));

    let result = container.set(Counter { count: 1 });
    assert!(matches!(result, Err(ContainerError::Config(_))));
    assert_eq!(container.get().count, 0);
}

#[test]
fn middleware_can_read_state_through_container() {
    let container = counter(3);
    let observed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&observed);

    container.add_middleware(from_fn(
        move |container: &Container<Counter>, action: Action<Counter>, next: &Next<'_, Counter>| {
            let before = container.get().count;
            next.run(action)?;
            sink.borrow_mut().push((before, container.get().count));
            Ok(())
        },
    ));

    container.transitions().call("increment", (2,)).unwrap();
    assert_eq!(*observed.borrow(), vec![(3, 5)]);
}

#[test]
fn builder_middleware_and_recorder() {
    let recorder = RecordingMiddleware::new(None);
    let recording = recorder.recording();

    let container = Container::builder(Counter { count: 0 })
        .transitions(counter_transitions())
        .selectors(counter_selectors())
        .middleware(LoggingMiddleware::new())
        .middleware(recorder)
        .build()
        .unwrap();

    container.set(Counter { count: 2 }).unwrap();
    container.transitions().call("increment", (3,)).unwrap();
    let _ = container.transitions().call("withdraw", (100,));

    assert_eq!(recording.kinds(), vec![SET_ACTION_TYPE, "increment", "withdraw"]);
    assert_eq!(recording.records()[1].args, vec![serde_json::json!(3)]);
    assert!(recording.records()[2].recorded_at >= recording.records()[0].recorded_at);
    assert_eq!(container.get().count, 5);
}

#[test]
fn middleware_can_dispatch_reentrantly() {
    let container = counter(0);
    let seen = record_counts(&container);

    container.add_middleware(from_fn(
        |container: &Container<Counter>, action: Action<Counter>, next: &Next<'_, Counter>| {
            next.run(action)?;
            if container.get().count == 1 {
                container.transitions().call("increment", (10,))?;
            }
            Ok(())
        },
    ));
    container.transitions().call("increment", (1,)).unwrap();

    assert_eq!(*seen.borrow(), vec![1, 11]);
    assert_eq!(container.get().count, 11);
}
