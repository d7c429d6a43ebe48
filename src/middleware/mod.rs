//! Middleware wrapped around dispatch.
//!
//! A middleware sees every action before the reducer does. It may forward the
//! action unchanged, forward a different action, forward several, or drop it by
//! not calling [`Next::run`].
//!
//! # Composition
//!
//! Installed middleware compose by nesting, not by iterating a list at dispatch
//! time:
//!
//! ```text
//! dispatch ──→ M2 ──→ M1 ──→ reducer ──→ publish
//!              (added last, runs first)
//! ```
//!
//! When M2 does not call `next.run`, neither M1 nor the reducer observe the
//! action.
//!
//! # Modules
//!
//! - [`logger`]: `tracing` span and events per dispatch
//! - [`recorder`]: timestamped action history

pub mod logger;
pub mod recorder;

pub use logger::LoggingMiddleware;
pub use recorder::{ActionRecord, Recording, RecordingMiddleware};

use crate::container::Container;
use crate::domain::action::Action;
use crate::domain::error::Result;
use std::fmt;
use std::rc::Rc;

/// Composed dispatch step: runs the remaining chain for one action.
pub(crate) type DispatchFn<S> = Rc<dyn Fn(&Container<S>, Action<S>) -> Result<()>>;

/// Cross-cutting behaviour around dispatch.
pub trait Middleware<S> {
    /// Handles `action` on behalf of `container`.
    ///
    /// Call `next.run(action)` to pass it inward. Errors returned here
    /// propagate to the caller of `dispatch`.
    ///
    /// # Errors
    ///
    /// Whatever the middleware or the inner chain returns.
    fn handle(
        &self,
        container: &Container<S>,
        action: Action<S>,
        next: &Next<'_, S>,
    ) -> Result<()>;
}

/// The remainder of the dispatch chain below a middleware.
pub struct Next<'a, S> {
    container: &'a Container<S>,
    inner: &'a DispatchFn<S>,
}

impl<S> Next<'_, S> {
    /// Passes `action` to the next middleware, or to the reducer.
    ///
    /// # Errors
    ///
    /// Propagates errors from inner middleware and the reducer.
    pub fn run(&self, action: Action<S>) -> Result<()> {
        (self.inner)(self.container, action)
    }
}

impl<S> fmt::Debug for Next<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Middleware built from a closure. See [`from_fn`].
pub struct FnMiddleware<F> {
    f: F,
}

impl<S, F> Middleware<S> for FnMiddleware<F>
where
    F: Fn(&Container<S>, Action<S>, &Next<'_, S>) -> Result<()>,
{
    fn handle(
        &self,
        container: &Container<S>,
        action: Action<S>,
        next: &Next<'_, S>,
    ) -> Result<()> {
        (self.f)(container, action, next)
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware").finish_non_exhaustive()
    }
}

/// Adapts a closure into a [`Middleware`].
///
/// ```
/// use state_containers::{middleware, Container};
///
/// let container = Container::new(0_i64);
/// // Drop every action.
/// container.add_middleware(middleware::from_fn(
///     |_container: &Container<i64>, _action, _next| Ok(()),
/// ));
/// container.set(5).unwrap();
/// assert_eq!(*container.get(), 0);
/// ```
pub fn from_fn<S, F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&Container<S>, Action<S>, &Next<'_, S>) -> Result<()>,
{
    FnMiddleware { f }
}

/// Nests `middlewares` around `base`; the last element ends up outermost.
pub(crate) fn compose<S: 'static>(
    base: DispatchFn<S>,
    middlewares: &[Rc<dyn Middleware<S>>],
) -> DispatchFn<S> {
    middlewares.iter().fold(base, |inner, middleware| {
        let middleware = Rc::clone(middleware);
        let outer: DispatchFn<S> =
            Rc::new(move |container: &Container<S>, action: Action<S>| {
                let next = Next {
                    container,
                    inner: &inner,
                };
                middleware.handle(container, action, &next)
            });
        outer
    })
}
