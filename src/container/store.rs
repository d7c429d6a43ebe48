//! The state container.
//!
//! [`Container`] owns the current state and is the only thing that ever
//! replaces it. All changes go through [`Container::dispatch`]:
//!
//! ```text
//! dispatch(action)
//!    │
//!    ▼
//! middleware chain (last added runs first)
//!    │
//!    ▼
//! verify freeze seal ──→ reducer(current, action) ──→ publish to subscribers
//! ```
//!
//! # Threading
//!
//! A container is a single-threaded value (`Rc` inside, `!Send`). Cloning it
//! yields another handle to the same state.
//!
//! # Re-entrancy
//!
//! A subscriber or middleware may dispatch while a dispatch is in progress.
//! The nested dispatch runs to completion, reducer and notifications included,
//! before the outer notification loop continues. Subscribers later in the outer
//! loop therefore see the newer state first and the older one after it.

use super::builder::ContainerBuilder;
use super::freeze::Freeze;
use super::reducer::Reducer;
use super::registry::{SelectorTable, Selectors, TransitionTable, Transitions};
use crate::domain::action::Action;
use crate::domain::error::Result;
use crate::middleware::{compose, DispatchFn, Middleware};
use crate::stream::{Broadcast, BroadcastStream, StateStream, Subscription};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

pub(crate) struct Inner<S> {
    pub(crate) data: Broadcast<Arc<S>>,
    pub(crate) reducer: RefCell<Rc<dyn Reducer<S>>>,
    pub(crate) middlewares: RefCell<Vec<Rc<dyn Middleware<S>>>>,
    pub(crate) dispatch: RefCell<DispatchFn<S>>,
    pub(crate) transitions: Rc<TransitionTable<S>>,
    pub(crate) selectors: SelectorTable<S>,
    pub(crate) freeze: Rc<dyn Freeze<S>>,
    pub(crate) notify_unchanged: bool,
}

/// Reactive container for one immutable state value.
///
/// # Example
///
/// ```
/// use state_containers::{Container, PureSelectors, PureTransitions};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Counter {
///     count: i64,
/// }
///
/// let container = Container::builder(Counter { count: 0 })
///     .transitions(PureTransitions::new().with("increment", |state: &Counter, (by,): (i64,)| {
///         Counter { count: state.count + by }
///     }))
///     .selectors(PureSelectors::new().with("getCount", |state: &Counter, (): ()| state.count))
///     .build()?;
///
/// container.transitions().call("increment", (5,))?;
/// assert_eq!(*container.get(), Counter { count: 5 });
/// assert_eq!(container.selectors().call::<i64, _>("getCount", ())?, 5);
/// # Ok::<(), state_containers::ContainerError>(())
/// ```
pub struct Container<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for Container<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug + 'static> Container<S> {
    /// Starts building a container around `default_state`.
    pub fn builder(default_state: S) -> ContainerBuilder<S> {
        ContainerBuilder::new(default_state)
    }

    /// Creates a container with no transitions, selectors or middleware.
    ///
    /// Uses the default [`Config`](crate::Config).
    pub fn new(default_state: S) -> Self {
        ContainerBuilder::new(default_state).build_empty()
    }

    pub(crate) fn from_inner(inner: Inner<S>) -> Self {
        Self {
            inner: Rc::new(inner),
        }
    }

    /// Returns the current state.
    ///
    /// O(1): clones the `Arc`, never the state.
    pub fn get(&self) -> Arc<S> {
        self.inner.data.get()
    }

    /// Alias of [`get`](Self::get).
    pub fn get_state(&self) -> Arc<S> {
        self.get()
    }

    /// Evaluates `f` against the current state.
    pub fn select<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(self.get().as_ref())
    }

    /// Replaces the whole state.
    ///
    /// Dispatches the reserved set action, so middleware and the freeze guard
    /// still apply. Unlike transitions, it succeeds when the held state has
    /// broken its freeze seal.
    ///
    /// # Parameters
    ///
    /// * `state` - The new state; it is frozen before it is stored
    ///
    /// # Errors
    ///
    /// Propagates errors from middleware, the reducer or the freeze guard.
    pub fn set(&self, state: S) -> Result<()> {
        self.dispatch(Action::Set(state))
    }

    /// Sends `action` through the middleware chain and the reducer.
    ///
    /// An action type with no registered transition leaves the state unchanged
    /// but still notifies subscribers unless
    /// [`Config::notify_unchanged`](crate::Config::notify_unchanged) is off.
    ///
    /// # Parameters
    ///
    /// * `action` - A set action or a named transition with positional args
    ///
    /// # Errors
    ///
    /// Propagates errors from middleware, the reducer or the freeze guard. On
    /// error the state is unchanged and nobody is notified.
    pub fn dispatch(&self, action: Action<S>) -> Result<()> {
        let chain = Rc::clone(&*self.inner.dispatch.borrow());
        chain(self, action)
    }

    /// Innermost dispatch step: reduce and publish.
    ///
    /// A broken freeze seal rejects every action except the set action, which
    /// installs a freshly sealed state.
    pub(crate) fn apply(&self, action: Action<S>) -> Result<()> {
        let current = self.get();
        if let Err(e) = self.inner.freeze.verify(&current) {
            if !action.is_set() {
                return Err(e);
            }
            tracing::warn!(error = %e, "replacing state with a broken freeze seal");
        }

        let reducer = Rc::clone(&*self.inner.reducer.borrow());
        let kind = action.kind().to_string();
        let next = reducer.reduce(&current, action)?;

        let changed = !Arc::ptr_eq(&current, &next);
        if !changed && !self.inner.notify_unchanged {
            tracing::trace!(action = %kind, "state unchanged, notification suppressed");
            return Ok(());
        }

        tracing::trace!(
            action = %kind,
            changed,
            subscribers = self.inner.data.listener_count(),
            "publishing state"
        );
        self.inner.data.publish(next);
        Ok(())
    }

    /// Callable view of the registered transitions.
    pub fn transitions(&self) -> Transitions<'_, S> {
        Transitions::new(self, &self.inner.transitions)
    }

    /// Callable view of the registered selectors.
    pub fn selectors(&self) -> Selectors<'_, S> {
        Selectors::new(self, &self.inner.selectors)
    }

    /// Installs `middleware` outside every middleware installed before it.
    ///
    /// The dispatch chain is recomposed; dispatches already running keep the
    /// chain they started with.
    pub fn add_middleware<M>(&self, middleware: M)
    where
        M: Middleware<S> + 'static,
    {
        let mut middlewares = self.inner.middlewares.borrow_mut();
        middlewares.push(Rc::new(middleware));
        let chain = compose(base_dispatch(), &middlewares);
        drop(middlewares);

        *self.inner.dispatch.borrow_mut() = chain;
        tracing::debug!(
            middlewares = self.inner.middlewares.borrow().len(),
            "middleware installed"
        );
    }

    /// Number of installed middleware.
    pub fn middleware_count(&self) -> usize {
        self.inner.middlewares.borrow().len()
    }

    /// Returns the active reducer.
    pub fn reducer(&self) -> Rc<dyn Reducer<S>> {
        Rc::clone(&*self.inner.reducer.borrow())
    }

    /// Replaces the reducer used by subsequent dispatches.
    ///
    /// The current state is kept; nothing is re-reduced.
    pub fn replace_reducer<R>(&self, next: R)
    where
        R: Reducer<S> + 'static,
    {
        *self.inner.reducer.borrow_mut() = Rc::new(next);
        tracing::debug!("reducer replaced");
    }

    /// Runs `state` through this container's freeze guard.
    ///
    /// For replacement reducers that build states outside the default reducer.
    pub fn freeze(&self, state: S) -> Arc<S> {
        self.inner.freeze.freeze(state)
    }

    /// Checks that the current state still matches its freeze seal.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::StateMutated`](crate::ContainerError::StateMutated)
    /// in development mode if the state was changed through interior mutability.
    pub fn verify(&self) -> Result<()> {
        self.inner.freeze.verify(&self.get())
    }

    /// Calls `listener` with every state published after this call.
    ///
    /// The state current at subscribe time is not delivered.
    ///
    /// # Parameters
    ///
    /// * `listener` - Called synchronously, in subscription order, on each publish
    ///
    /// # Returns
    ///
    /// A handle whose [`unsubscribe`](Subscription::unsubscribe) removes the
    /// listener. Dropping the handle leaves the listener registered.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<S>) + 'static,
    {
        self.inner.data.subscribe(listener)
    }

    /// Stream of every state published after this call.
    ///
    /// Dropping the stream unsubscribes it.
    ///
    /// # Returns
    ///
    /// A `futures` stream that yields each published `Arc<S>` in order and
    /// never ends on its own.
    pub fn state_stream(&self) -> StateStream<S> {
        BroadcastStream::new(&self.inner.data)
    }

    /// Number of active subscriptions, streams included.
    pub fn subscriber_count(&self) -> usize {
        self.inner.data.listener_count()
    }
}

/// Dispatch step with no middleware.
pub(crate) fn base_dispatch<S: fmt::Debug + 'static>() -> DispatchFn<S> {
    Rc::new(|container: &Container<S>, action: Action<S>| container.apply(action))
}

impl<S: fmt::Debug> fmt::Debug for Container<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("state", &self.inner.data)
            .field("transitions", &self.inner.transitions)
            .field("selectors", &self.inner.selectors)
            .field("middlewares", &self.inner.middlewares.borrow().len())
            .field("notify_unchanged", &self.inner.notify_unchanged)
            .finish_non_exhaustive()
    }
}
