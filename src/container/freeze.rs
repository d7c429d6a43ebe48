//! Freeze guards applied to every state the container accepts.
//!
//! A held state is an `Arc<S>`, so code outside the container only ever gets a
//! shared reference: assigning to a field of a value returned by `get()` does
//! not compile, and `Arc::make_mut` mutates a private copy the container never
//! sees. What remains is interior mutability (`Cell`, `RefCell`, atomics) inside
//! `S`. [`DeepFreeze`] seals each accepted state with a fingerprint so that such
//! changes are detected: every later transition is rejected with
//! [`ContainerError::StateMutated`] until a set action installs a fresh state.
//!
//! # Modes
//!
//! | Mode          | Default guard | Cost per accepted state      |
//! |---------------|---------------|------------------------------|
//! | `Development` | [`DeepFreeze`]| one `Debug` walk, no copies  |
//! | `Production`  | [`Identity`]  | none                         |
//!
//! Either can be replaced with [`FreezeFn`], e.g. `FreezeFn::new(|s| s)` when
//! external mutation is an accepted risk.

use crate::domain::error::{ContainerError, Result};
use crate::Mode;
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{self, Write as _};
use std::hash::Hasher;
use std::rc::Rc;
use std::sync::{Arc, Weak};

/// Accepts state values into a container.
pub trait Freeze<S> {
    /// Takes ownership of `state` and returns the shared value the container holds.
    fn freeze(&self, state: S) -> Arc<S>;

    /// Confirms that `state`, previously returned by [`freeze`](Self::freeze), is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::StateMutated`] if the guard can tell it changed.
    fn verify(&self, state: &Arc<S>) -> Result<()> {
        let _ = state;
        Ok(())
    }
}

/// Guard that performs no checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<S> Freeze<S> for Identity {
    fn freeze(&self, state: S) -> Arc<S> {
        Arc::new(state)
    }
}

/// Guard that fingerprints each accepted state and detects later changes.
///
/// The fingerprint is a hash of the value's `Debug` rendering, streamed into
/// the hasher. Only the most recently frozen value is tracked; it is the one
/// the container holds.
pub struct DeepFreeze<S> {
    seal: RefCell<Option<(Weak<S>, u64)>>,
}

impl<S> DeepFreeze<S> {
    /// Creates a guard with no sealed value.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seal: RefCell::new(None),
        }
    }
}

impl<S> Default for DeepFreeze<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> Freeze<S> for DeepFreeze<S> {
    fn freeze(&self, state: S) -> Arc<S> {
        let fingerprint = fingerprint(&state);
        let frozen = Arc::new(state);
        *self.seal.borrow_mut() = Some((Arc::downgrade(&frozen), fingerprint));
        frozen
    }

    fn verify(&self, state: &Arc<S>) -> Result<()> {
        let seal = self.seal.borrow();
        let Some((sealed, expected)) = seal.as_ref() else {
            return Ok(());
        };

        // States installed by a replaced reducer without going through this
        // guard carry no seal.
        if !std::ptr::eq(sealed.as_ptr(), Arc::as_ptr(state)) {
            return Ok(());
        }

        if fingerprint(state.as_ref()) == *expected {
            Ok(())
        } else {
            tracing::warn!("frozen state changed after it was accepted");
            Err(ContainerError::StateMutated)
        }
    }
}

impl<S> fmt::Debug for DeepFreeze<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepFreeze")
            .field("sealed", &self.seal.borrow().is_some())
            .finish()
    }
}

/// Guard built from a caller-supplied `Fn(S) -> S`.
pub struct FreezeFn<F> {
    f: F,
}

impl<F> FreezeFn<F> {
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<S, F> Freeze<S> for FreezeFn<F>
where
    F: Fn(S) -> S,
{
    fn freeze(&self, state: S) -> Arc<S> {
        Arc::new((self.f)(state))
    }
}

impl<F> fmt::Debug for FreezeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreezeFn").finish_non_exhaustive()
    }
}

/// Returns the default guard for `mode`.
pub fn for_mode<S: fmt::Debug + 'static>(mode: Mode) -> Rc<dyn Freeze<S>> {
    match mode {
        Mode::Development => Rc::new(DeepFreeze::new()),
        Mode::Production => Rc::new(Identity),
    }
}

struct HashWriter<'a>(&'a mut DefaultHasher);

impl fmt::Write for HashWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write(s.as_bytes());
        Ok(())
    }
}

fn fingerprint<S: fmt::Debug + ?Sized>(state: &S) -> u64 {
    let mut hasher = DefaultHasher::new();
    // Writing into a hasher cannot fail.
    let _ = write!(HashWriter(&mut hasher), "{state:?}");
    hasher.finish()
}
