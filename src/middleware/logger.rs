//! Dispatch logging through `tracing`.

use super::{Middleware, Next};
use crate::container::Container;
use crate::domain::action::Action;
use crate::domain::error::Result;
use std::fmt;
use std::sync::Arc;

/// Opens a `dispatch` span per action and logs its outcome.
///
/// Emits at `debug` the action type, argument count and whether the state
/// changed, at `trace` the resulting state, and at `warn` any error returned
/// by the inner chain. With the OpenTelemetry layer from
/// [`init_tracing`](crate::observability::init_tracing) installed, every span
/// is exported.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S: fmt::Debug + 'static> Middleware<S> for LoggingMiddleware {
    fn handle(
        &self,
        container: &Container<S>,
        action: Action<S>,
        next: &Next<'_, S>,
    ) -> Result<()> {
        let kind = action.kind().to_string();
        let span = tracing::debug_span!("dispatch", action = %kind);
        let _guard = span.enter();

        tracing::debug!(args = action.args().len(), "dispatching action");
        let before = container.get();

        match next.run(action) {
            Ok(()) => {
                let after = container.get();
                let changed = !Arc::ptr_eq(&before, &after);
                tracing::debug!(changed, "action dispatched");
                tracing::trace!(state = ?after, "current state");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "dispatch failed");
                Err(e)
            }
        }
    }
}
