//! Container construction.
//!
//! [`ContainerBuilder`] gathers the default state, the pure transitions and
//! selectors, the freeze guard and the initial middleware. `build()` is the
//! single finalize step: it validates the registries, freezes the default
//! state and composes the dispatch chain once.

use super::freeze::{self, Freeze, FreezeFn};
use super::reducer::{Reducer, TransitionReducer};
use super::registry::{PureSelectors, PureTransitions, SelectorTable, TransitionTable};
use super::store::{base_dispatch, Container, Inner};
use crate::domain::error::Result;
use crate::middleware::{compose, Middleware};
use crate::stream::Broadcast;
use crate::{Config, Mode};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Builder for [`Container`].
///
/// # Example
///
/// ```
/// use state_containers::{Container, LoggingMiddleware, Mode};
///
/// let container = Container::builder(vec!["milk".to_string()])
///     .mode(Mode::Production)
///     .notify_unchanged(false)
///     .middleware(LoggingMiddleware::new())
///     .build()?;
///
/// assert_eq!(container.get().len(), 1);
/// # Ok::<(), state_containers::ContainerError>(())
/// ```
pub struct ContainerBuilder<S> {
    default_state: S,
    transitions: PureTransitions<S>,
    selectors: PureSelectors<S>,
    config: Config,
    freeze: Option<Rc<dyn Freeze<S>>>,
    middlewares: Vec<Rc<dyn Middleware<S>>>,
}

impl<S: fmt::Debug + 'static> ContainerBuilder<S> {
    /// Starts a builder with empty registries and the default [`Config`].
    ///
    /// # Parameters
    ///
    /// * `default_state` - Initial state, sealed by the freeze guard on build
    pub fn new(default_state: S) -> Self {
        Self {
            default_state,
            transitions: PureTransitions::new(),
            selectors: PureSelectors::new(),
            config: Config::default(),
            freeze: None,
            middlewares: Vec::new(),
        }
    }

    /// Sets the pure transitions.
    #[must_use]
    pub fn transitions(mut self, transitions: PureTransitions<S>) -> Self {
        self.transitions = transitions;
        self
    }

    /// Sets the pure selectors.
    #[must_use]
    pub fn selectors(mut self, selectors: PureSelectors<S>) -> Self {
        self.selectors = selectors;
        self
    }

    /// Applies `config`: freeze mode and notification policy.
    ///
    /// # Parameters
    ///
    /// * `config` - Configuration to read; tracing and history keys are ignored here
    #[must_use]
    pub fn config(mut self, config: &Config) -> Self {
        self.config = config.clone();
        self
    }

    /// Selects the default freeze guard.
    ///
    /// Ignored when a guard is supplied with [`freeze`](Self::freeze) or
    /// [`freeze_with`](Self::freeze_with).
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Whether subscribers are notified when a dispatch leaves the state unchanged.
    #[must_use]
    pub fn notify_unchanged(mut self, notify: bool) -> Self {
        self.config.notify_unchanged = notify;
        self
    }

    /// Replaces the freeze guard.
    #[must_use]
    pub fn freeze<G>(mut self, guard: G) -> Self
    where
        G: Freeze<S> + 'static,
    {
        self.freeze = Some(Rc::new(guard));
        self
    }

    /// Replaces the freeze guard with a plain function.
    ///
    /// `freeze_with(|state| state)` disables mutation checks entirely.
    ///
    /// # Parameters
    ///
    /// * `f` - Called with every state the container accepts; its result is stored
    #[must_use]
    pub fn freeze_with<F>(self, f: F) -> Self
    where
        F: Fn(S) -> S + 'static,
    {
        self.freeze(FreezeFn::new(f))
    }

    /// Appends a middleware. Later middleware run before earlier ones.
    ///
    /// # Parameters
    ///
    /// * `middleware` - Wraps every dispatch of the built container
    #[must_use]
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<S> + 'static,
    {
        self.middlewares.push(Rc::new(middleware));
        self
    }

    /// Validates the registries and creates the container.
    ///
    /// # Returns
    ///
    /// A container holding the frozen default state, with no subscribers.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::DuplicateName`](crate::ContainerError::DuplicateName)
    ///   if a transition or selector name is registered twice
    /// - [`ContainerError::ReservedName`](crate::ContainerError::ReservedName)
    ///   if a transition uses the set-action type
    pub fn build(self) -> Result<Container<S>> {
        let Self {
            default_state,
            transitions,
            selectors,
            config,
            freeze,
            middlewares,
        } = self;

        let transitions = transitions.into_table()?;
        let selectors = selectors.into_table()?;
        Ok(assemble(
            default_state,
            transitions,
            selectors,
            &config,
            freeze,
            middlewares,
        ))
    }

    /// Creates the container ignoring any registered transitions or selectors.
    pub(crate) fn build_empty(self) -> Container<S> {
        assemble(
            self.default_state,
            TransitionTable::empty(),
            SelectorTable::empty(),
            &self.config,
            self.freeze,
            self.middlewares,
        )
    }
}

impl<S> fmt::Debug for ContainerBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("transitions", &self.transitions)
            .field("selectors", &self.selectors)
            .field("config", &self.config)
            .field("custom_freeze", &self.freeze.is_some())
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

fn assemble<S: fmt::Debug + 'static>(
    default_state: S,
    transitions: TransitionTable<S>,
    selectors: SelectorTable<S>,
    config: &Config,
    freeze: Option<Rc<dyn Freeze<S>>>,
    middlewares: Vec<Rc<dyn Middleware<S>>>,
) -> Container<S> {
    let freeze = freeze.unwrap_or_else(|| freeze::for_mode(config.mode));
    let transitions = Rc::new(transitions);
    let reducer: Rc<dyn Reducer<S>> = Rc::new(TransitionReducer::new(
        Rc::clone(&transitions),
        Rc::clone(&freeze),
    ));
    let initial = freeze.freeze(default_state);
    let dispatch = compose(base_dispatch(), &middlewares);

    tracing::debug!(
        mode = ?config.mode,
        transitions = transitions.len(),
        selectors = selectors.len(),
        middlewares = middlewares.len(),
        notify_unchanged = config.notify_unchanged,
        "state container created"
    );

    Container::from_inner(Inner {
        data: Broadcast::new(initial),
        reducer: RefCell::new(reducer),
        middlewares: RefCell::new(middlewares),
        dispatch: RefCell::new(dispatch),
        transitions,
        selectors,
        freeze,
        notify_unchanged: config.notify_unchanged,
    })
}
