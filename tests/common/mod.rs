#![allow(dead_code)]

use state_containers::{Container, PureSelectors, PureTransitions};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub count: i64,
}

pub fn counter_transitions() -> PureTransitions<Counter> {
    PureTransitions::new()
        .with("increment", |state: &Counter, (by,): (i64,)| Counter {
            count: state.count + by,
        })
        .with("reset", |_state: &Counter, (): ()| Counter { count: 0 })
        .try_with("withdraw", |state: &Counter, (amount,): (i64,)| {
            if amount > state.count {
                Err("insufficient funds".to_string())
            } else {
                Ok(Counter {
                    count: state.count - amount,
                })
            }
        })
}

pub fn counter_selectors() -> PureSelectors<Counter> {
    PureSelectors::new()
        .with("getCount", |state: &Counter, (): ()| state.count)
        .with("isAbove", |state: &Counter, (limit,): (i64,)| state.count > limit)
}

pub fn counter(count: i64) -> Container<Counter> {
    Container::builder(Counter { count })
        .transitions(counter_transitions())
        .selectors(counter_selectors())
        .build()
        .unwrap()
}

/// Subscribes a listener that records every published count.
pub fn record_counts(container: &Container<Counter>) -> Rc<RefCell<Vec<i64>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    container.subscribe(move |state: &Arc<Counter>| sink.borrow_mut().push(state.count));
    seen
}
