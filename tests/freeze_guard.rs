mod common;

use common::{counter, Counter};
use state_containers::{Action, Container, ContainerError, DeepFreeze, Mode};
use std::cell::Cell;
use std::sync::Arc;

#[derive(Debug)]
struct Meter {
    reads: Cell<u32>,
    label: String,
}

fn meter() -> Meter {
    Meter {
        reads: Cell::new(0),
        label: "main".to_string(),
    }
}

fn development_meter() -> Container<Meter> {
    Container::builder(meter())
        .mode(Mode::Development)
        .build()
        .unwrap()
}

#[test]
fn make_mut_on_a_read_state_never_reaches_the_container() {
    let container = counter(0);
    let mut held = container.get();

    Arc::make_mut(&mut held).count = 99;

    assert_eq!(held.count, 99);
    assert_eq!(container.get().count, 0);
    assert!(container.verify().is_ok());
    container.set(Counter { count: 1 }).unwrap();
}

#[test]
fn interior_mutation_rejects_transitions_in_development() {
    let container = development_meter();

    container.get().reads.set(7);

    assert!(matches!(container.verify(), Err(ContainerError::StateMutated)));
    assert!(matches!(
        container.dispatch(Action::new("anything", vec![])),
        Err(ContainerError::StateMutated)
    ));
}

#[test]
fn set_recovers_after_interior_mutation() {
    let container = development_meter();
    container.get().reads.set(7);

    container
        .set(Meter {
            reads: Cell::new(1),
            label: "fresh".to_string(),
        })
        .unwrap();

    assert_eq!(container.get().reads.get(), 1);
    assert_eq!(container.get().label, "fresh");
    assert!(container.verify().is_ok());
    container.dispatch(Action::new("anything", vec![])).unwrap();
}

#[test]
fn newly_set_state_is_sealed() {
    let container = development_meter();

    container
        .set(Meter {
            reads: Cell::new(1),
            label: "second".to_string(),
        })
        .unwrap();
    assert!(container.verify().is_ok());

    container.get().reads.set(2);
    assert!(matches!(container.verify(), Err(ContainerError::StateMutated)));
}

#[test]
fn production_mode_performs_no_checks() {
    let container = Container::builder(meter())
        .mode(Mode::Production)
        .build()
        .unwrap();

    container.get().reads.set(7);

    assert!(container.verify().is_ok());
    container.dispatch(Action::new("anything", vec![])).unwrap();
    container.set(meter()).unwrap();
    assert_eq!(container.get().label, "main");
}

#[test]
fn identity_freeze_function_disables_checks() {
    let container = Container::builder(meter())
        .mode(Mode::Development)
        .freeze_with(|state| state)
        .build()
        .unwrap();

    container.get().reads.set(3);
    container.dispatch(Action::new("anything", vec![])).unwrap();
    container.set(meter()).unwrap();
    assert_eq!(container.get().reads.get(), 0);
}

#[test]
fn custom_freeze_function_transforms_accepted_states() {
    let container = Container::builder(Counter { count: -4 })
        .freeze_with(|state: Counter| Counter {
            count: state.count.max(0),
        })
        .build()
        .unwrap();

    assert_eq!(container.get().count, 0);
    container.set(Counter { count: -1 }).unwrap();
    assert_eq!(container.get().count, 0);
}

#[test]
fn explicit_deep_freeze_guard_overrides_mode() {
    let container = Container::builder(meter())
        .mode(Mode::Production)
        .freeze(DeepFreeze::new())
        .build()
        .unwrap();

    container.get().reads.set(1);
    assert!(matches!(container.verify(), Err(ContainerError::StateMutated)));
}
