//! Named pure transitions and selectors.
//!
//! [`PureTransitions`] and [`PureSelectors`] collect typed closures by name.
//! At construction they are validated and frozen into tables; afterwards the
//! set of names never changes. The container exposes the tables through the
//! [`Transitions`] and [`Selectors`] views.
//!
//! Each closure takes the state and one argument tuple. Positional arguments
//! arrive as JSON values and are decoded into that tuple when the transition
//! or selector runs, so an arity or type mismatch is reported as
//! [`ContainerError::InvalidArgs`] instead of panicking.
//!
//! # Example
//!
//! ```
//! use state_containers::{PureSelectors, PureTransitions};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! let transitions = PureTransitions::new()
//!     .with("increment", |state: &Counter, (by,): (i64,)| Counter {
//!         count: state.count + by,
//!     })
//!     .with("reset", |_: &Counter, (): ()| Counter { count: 0 });
//!
//! let selectors = PureSelectors::new().with("getCount", |state: &Counter, (): ()| state.count);
//!
//! assert_eq!(transitions.len(), 2);
//! assert_eq!(selectors.len(), 1);
//! ```

use super::store::Container;
use crate::domain::action::{decode_args, to_args, Action, SET_ACTION_TYPE};
use crate::domain::error::{BoxError, ContainerError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

type TransitionFn<S> = Box<dyn Fn(&str, &S, &[Value]) -> Result<S>>;
type SelectorFn<S> = Box<dyn Fn(&str, &S, &[Value]) -> Result<Box<dyn Any>>>;

/// A registered transition with its argument decoding erased.
pub struct ErasedTransition<S> {
    f: TransitionFn<S>,
}

impl<S> ErasedTransition<S> {
    /// Decodes `args` and applies the transition to `state`.
    pub(crate) fn apply(&self, name: &str, state: &S, args: &[Value]) -> Result<S> {
        (self.f)(name, state, args)
    }
}

/// Builder collecting pure transitions by name.
pub struct PureTransitions<S> {
    entries: Vec<(String, ErasedTransition<S>)>,
}

impl<S: 'static> PureTransitions<S> {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers an infallible transition under `name`.
    ///
    /// `A` is the positional argument tuple, e.g. `(i64,)` or `()`.
    ///
    /// # Parameters
    ///
    /// * `name` - Action type that triggers the transition
    /// * `transition` - Maps the current state and decoded args to the next state
    ///
    /// Duplicate names are reported by [`ContainerBuilder::build`](crate::ContainerBuilder::build).
    #[must_use]
    pub fn with<A, F>(mut self, name: impl Into<String>, transition: F) -> Self
    where
        A: DeserializeOwned + 'static,
        F: Fn(&S, A) -> S + 'static,
    {
        let f: TransitionFn<S> = Box::new(move |name: &str, state: &S, args: &[Value]| {
            let args: A = decode_args(name, args)?;
            Ok(transition(state, args))
        });
        self.entries.push((name.into(), ErasedTransition { f }));
        self
    }

    /// Registers a transition that may fail.
    ///
    /// A returned error aborts the dispatch with [`ContainerError::Transition`];
    /// the container state is left as it was.
    ///
    /// # Parameters
    ///
    /// * `name` - Action type that triggers the transition
    /// * `transition` - Returns the next state, or an error to reject the action
    #[must_use]
    pub fn try_with<A, E, F>(mut self, name: impl Into<String>, transition: F) -> Self
    where
        A: DeserializeOwned + 'static,
        E: Into<BoxError>,
        F: Fn(&S, A) -> std::result::Result<S, E> + 'static,
    {
        let f: TransitionFn<S> = Box::new(move |name: &str, state: &S, args: &[Value]| {
            let args: A = decode_args(name, args)?;
            transition(state, args).map_err(|source| ContainerError::Transition {
                name: name.to_string(),
                source: source.into(),
            })
        });
        self.entries.push((name.into(), ErasedTransition { f }));
        self
    }

    /// Number of registered transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validates names and builds the lookup table.
    pub(crate) fn into_table(self) -> Result<TransitionTable<S>> {
        let mut entries = BTreeMap::new();
        for (name, transition) in self.entries {
            if name == SET_ACTION_TYPE {
                return Err(ContainerError::ReservedName(name));
            }
            if entries.contains_key(&name) {
                return Err(ContainerError::DuplicateName {
                    kind: "transition",
                    name,
                });
            }
            entries.insert(name, transition);
        }
        Ok(TransitionTable { entries })
    }
}

impl<S: 'static> Default for PureTransitions<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for PureTransitions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

/// Immutable name → transition table.
pub struct TransitionTable<S> {
    entries: BTreeMap<String, ErasedTransition<S>>,
}

impl<S> TransitionTable<S> {
    pub(crate) const fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&ErasedTransition<S>> {
        self.entries.get(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<S> fmt::Debug for TransitionTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Builder collecting pure selectors by name.
pub struct PureSelectors<S> {
    entries: Vec<(String, SelectorFn<S>)>,
}

impl<S: 'static> PureSelectors<S> {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a selector under `name`.
    ///
    /// The selector's output type `R` is the type later requested from
    /// [`Selectors::call`].
    ///
    /// # Parameters
    ///
    /// * `name` - Name used with [`Selectors::call`]
    /// * `selector` - Derives a value from the state and decoded args
    #[must_use]
    pub fn with<A, R, F>(mut self, name: impl Into<String>, selector: F) -> Self
    where
        A: DeserializeOwned + 'static,
        R: 'static,
        F: Fn(&S, A) -> R + 'static,
    {
        let f: SelectorFn<S> = Box::new(move |name: &str, state: &S, args: &[Value]| {
            let args: A = decode_args(name, args)?;
            Ok(Box::new(selector(state, args)) as Box<dyn Any>)
        });
        self.entries.push((name.into(), f));
        self
    }

    /// Number of registered selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_table(self) -> Result<SelectorTable<S>> {
        let mut entries = BTreeMap::new();
        for (name, selector) in self.entries {
            if entries.contains_key(&name) {
                return Err(ContainerError::DuplicateName {
                    kind: "selector",
                    name,
                });
            }
            entries.insert(name, selector);
        }
        Ok(SelectorTable { entries })
    }
}

impl<S: 'static> Default for PureSelectors<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for PureSelectors<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

/// Immutable name → selector table.
pub struct SelectorTable<S> {
    entries: BTreeMap<String, SelectorFn<S>>,
}

impl<S> SelectorTable<S> {
    pub(crate) const fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<S> fmt::Debug for SelectorTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Callable view of a container's registered transitions.
///
/// Calling a transition dispatches `Action::Transition { name, args }` through
/// the container's middleware and reducer. It returns no value; the effect is
/// observable through `get` and subscriptions.
pub struct Transitions<'a, S> {
    container: &'a Container<S>,
    table: &'a TransitionTable<S>,
}

impl<'a, S: fmt::Debug + 'static> Transitions<'a, S> {
    pub(crate) const fn new(container: &'a Container<S>, table: &'a TransitionTable<S>) -> Self {
        Self { container, table }
    }

    /// Dispatches the transition `name` with positional `args`.
    ///
    /// # Parameters
    ///
    /// * `name` - Registered transition name
    /// * `args` - Argument tuple, encoded with [`to_args`](crate::to_args)
    ///
    /// # Errors
    ///
    /// - [`ContainerError::UnknownTransition`] if `name` was never registered
    /// - [`ContainerError::ArgsEncoding`] if `args` are not JSON-representable
    /// - any error produced while dispatching
    pub fn call<A: Serialize>(&self, name: &str, args: A) -> Result<()> {
        if !self.table.contains(name) {
            return Err(ContainerError::UnknownTransition(name.to_string()));
        }
        self.container.dispatch(Action::new(name, to_args(args)?))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.table.names()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    /// Number of registered transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no transition is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }
}

/// Callable view of a container's registered selectors.
///
/// Every call evaluates the selector against the state current at call time.
/// Results are not memoised.
pub struct Selectors<'a, S> {
    container: &'a Container<S>,
    table: &'a SelectorTable<S>,
}

impl<'a, S: fmt::Debug + 'static> Selectors<'a, S> {
    pub(crate) const fn new(container: &'a Container<S>, table: &'a SelectorTable<S>) -> Self {
        Self { container, table }
    }

    /// Evaluates the selector `name` with positional `args`.
    ///
    /// # Parameters
    ///
    /// * `name` - Registered selector name
    /// * `args` - Argument tuple, encoded with [`to_args`](crate::to_args)
    ///
    /// # Returns
    ///
    /// The selector's output for the current state, downcast to `R`.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::UnknownSelector`] if `name` was never registered
    /// - [`ContainerError::ArgsEncoding`] if `args` are not JSON-representable
    /// - [`ContainerError::InvalidArgs`] if `args` do not fit the selector
    /// - [`ContainerError::SelectorOutput`] if the selector does not produce `R`
    pub fn call<R: 'static, A: Serialize>(&self, name: &str, args: A) -> Result<R> {
        let selector = self
            .table
            .entries
            .get(name)
            .ok_or_else(|| ContainerError::UnknownSelector(name.to_string()))?;

        let args = to_args(args)?;
        let state = self.container.get();
        let output = selector(name, &*state, args.as_slice())?;

        output
            .downcast::<R>()
            .map(|value| *value)
            .map_err(|_| ContainerError::SelectorOutput {
                name: name.to_string(),
                expected: std::any::type_name::<R>(),
            })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.table.entries.keys().map(String::as_str)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.entries.contains_key(name)
    }

    /// Number of registered selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no selector is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_transition_names_are_rejected() {
        let result = PureTransitions::new()
            .with("inc", |n: &i64, (): ()| n + 1)
            .with("inc", |n: &i64, (): ()| n + 2)
            .into_table();
        assert!(matches!(
            result,
            Err(ContainerError::DuplicateName { kind: "transition", .. })
        ));
    }

    #[test]
    fn reserved_set_name_is_rejected() {
        let result = PureTransitions::new()
            .with(SET_ACTION_TYPE, |n: &i64, (): ()| *n)
            .into_table();
        assert!(matches!(result, Err(ContainerError::ReservedName(_))));
    }

    #[test]
    fn duplicate_selector_names_are_rejected() {
        let result = PureSelectors::new()
            .with("get", |n: &i64, (): ()| *n)
            .with("get", |n: &i64, (): ()| *n * 2)
            .into_table();
        assert!(matches!(
            result,
            Err(ContainerError::DuplicateName { kind: "selector", .. })
        ));
    }

    #[test]
    fn fallible_transition_reports_its_name() {
        let table = PureTransitions::new()
            .try_with("withdraw", |balance: &i64, (amount,): (i64,)| {
                if amount > *balance {
                    Err("insufficient funds")
                } else {
                    Ok(balance - amount)
                }
            })
            .into_table()
            .unwrap();

        let transition = table.get("withdraw").unwrap();
        assert_eq!(
            transition
                .apply("withdraw", &10, &[serde_json::json!(4)])
                .unwrap(),
            6
        );

        let err = transition
            .apply("withdraw", &10, &[serde_json::json!(40)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "transition 'withdraw' failed: insufficient funds"
        );
    }

    #[test]
    fn table_names_are_sorted() {
        let table = PureTransitions::new()
            .with("zeta", |n: &i64, (): ()| *n)
            .with("alpha", |n: &i64, (): ()| *n)
            .into_table()
            .unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }
}
