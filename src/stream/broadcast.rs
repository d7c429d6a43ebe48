//! Single-value broadcast cell.
//!
//! [`Broadcast`] stores one current value and an ordered list of listeners.
//! Publishing replaces the value and calls every listener registered at that
//! moment and still registered when its turn comes. Subscribing never replays
//! the current value.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Listener<T> {
    id: u64,
    active: Rc<Cell<bool>>,
    callback: Callback<T>,
}

struct Shared<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<Listener<T>>>,
    next_id: Cell<u64>,
}

/// Value cell with push notification to late subscribers.
///
/// Listeners are called synchronously, in registration order, on the thread
/// that publishes. The listener list is snapshotted before the first call so a
/// listener may subscribe, unsubscribe or publish again while being notified.
/// A listener subscribed during a publish first hears the next one; a listener
/// unsubscribed during a publish is skipped if its turn has not come yet.
pub struct Broadcast<T> {
    shared: Rc<Shared<T>>,
}

impl<T: Clone + 'static> Broadcast<T> {
    /// Creates a cell holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(initial),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// Stores `value` and notifies every current listener with it.
    ///
    /// # Parameters
    ///
    /// * `value` - The new current value
    pub fn publish(&self, value: T) {
        *self.shared.value.borrow_mut() = value.clone();

        let snapshot: Vec<(Rc<Cell<bool>>, Callback<T>)> = self
            .shared
            .listeners
            .borrow()
            .iter()
            .map(|listener| (Rc::clone(&listener.active), Rc::clone(&listener.callback)))
            .collect();

        for (active, callback) in snapshot {
            if active.get() {
                callback(&value);
            }
        }
    }

    /// Registers `listener` for every value published from now on.
    ///
    /// # Parameters
    ///
    /// * `listener` - Called with each published value
    ///
    /// # Returns
    ///
    /// A [`Subscription`] that deregisters the listener. Dropping it keeps the
    /// listener registered.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);
        let active = Rc::new(Cell::new(true));
        self.shared.listeners.borrow_mut().push(Listener {
            id,
            active: Rc::clone(&active),
            callback: Rc::new(listener),
        });

        let shared: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            active.set(false);
            if let Some(shared) = shared.upgrade() {
                shared.listeners.borrow_mut().retain(|listener| listener.id != id);
            }
        })
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcast")
            .field("value", &self.shared.value.borrow())
            .field("listeners", &self.shared.listeners.borrow().len())
            .finish()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
/// Unsubscribing more than once is a no-op.
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// Deregisters the listener.
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Returns `true` once [`unsubscribe`](Self::unsubscribe) has been called.
    pub fn is_closed(&self) -> bool {
        self.cancel.borrow().is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}
