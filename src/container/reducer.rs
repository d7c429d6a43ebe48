//! Reducers fold an action into the next state.
//!
//! The reducer is the only place a new state is computed. It must be total:
//! an action it does not recognise yields the input `Arc` unchanged.

use super::freeze::Freeze;
use super::registry::TransitionTable;
use crate::domain::action::Action;
use crate::domain::error::Result;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Computes the next state from the current state and an action.
///
/// Implementations should be pure. Returning the input `Arc` (pointer-equal)
/// signals that nothing changed.
pub trait Reducer<S> {
    /// Reduces `action` against `state`.
    ///
    /// # Errors
    ///
    /// Errors propagate to the caller of `dispatch`; the container keeps its
    /// current state.
    fn reduce(&self, state: &Arc<S>, action: Action<S>) -> Result<Arc<S>>;
}

impl<S> Reducer<S> for Rc<dyn Reducer<S>> {
    fn reduce(&self, state: &Arc<S>, action: Action<S>) -> Result<Arc<S>> {
        (**self).reduce(state, action)
    }
}

/// Default reducer: the reserved set action plus registered pure transitions.
pub struct TransitionReducer<S> {
    transitions: Rc<TransitionTable<S>>,
    freeze: Rc<dyn Freeze<S>>,
}

impl<S> TransitionReducer<S> {
    pub(crate) fn new(transitions: Rc<TransitionTable<S>>, freeze: Rc<dyn Freeze<S>>) -> Self {
        Self {
            transitions,
            freeze,
        }
    }
}

impl<S> Reducer<S> for TransitionReducer<S> {
    fn reduce(&self, state: &Arc<S>, action: Action<S>) -> Result<Arc<S>> {
        match action {
            Action::Set(next) => Ok(self.freeze.freeze(next)),
            Action::Transition { name, args } => match self.transitions.get(&name) {
                Some(transition) => {
                    let next = transition.apply(&name, state, &args)?;
                    Ok(self.freeze.freeze(next))
                }
                None => {
                    tracing::trace!(action = %name, "no transition registered, state unchanged");
                    Ok(Arc::clone(state))
                }
            },
        }
    }
}

impl<S> fmt::Debug for TransitionReducer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionReducer")
            .field("transitions", &self.transitions)
            .finish_non_exhaustive()
    }
}

/// Reducer built from a closure. See [`reducer_fn`].
pub struct FnReducer<F> {
    f: F,
}

impl<S, F> Reducer<S> for FnReducer<F>
where
    F: Fn(&Arc<S>, Action<S>) -> Result<Arc<S>>,
{
    fn reduce(&self, state: &Arc<S>, action: Action<S>) -> Result<Arc<S>> {
        (self.f)(state, action)
    }
}

/// Adapts a closure into a [`Reducer`].
///
/// Typically used with [`Container::reducer`](crate::Container::reducer) to wrap
/// the active reducer:
///
/// ```
/// use std::sync::Arc;
/// use state_containers::{reducer_fn, Action, Container, Reducer};
///
/// let container = Container::new(0_i64);
/// let previous = container.reducer();
/// container.replace_reducer(reducer_fn(move |state: &Arc<i64>, action: Action<i64>| {
///     if action.kind() == "reset" {
///         return Ok(Arc::new(0));
///     }
///     previous.reduce(state, action)
/// }));
/// ```
pub const fn reducer_fn<S, F>(f: F) -> FnReducer<F>
where
    F: Fn(&Arc<S>, Action<S>) -> Result<Arc<S>>,
{
    FnReducer { f }
}
