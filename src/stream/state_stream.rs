//! `futures` stream adapter over a [`Broadcast`] cell.

use super::broadcast::{Broadcast, Subscription};
use futures_util::stream::Stream;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// Stream of states published by a container.
pub type StateStream<S> = BroadcastStream<Arc<S>>;

struct Buffer<T> {
    queue: VecDeque<T>,
    waker: Option<Waker>,
}

/// Stream of values published after the stream was created.
///
/// Values are buffered until polled, so none are lost between polls. The
/// stream never terminates on its own; dropping it deregisters its listener.
pub struct BroadcastStream<T> {
    buffer: Rc<RefCell<Buffer<T>>>,
    subscription: Subscription,
}

impl<T: Clone + 'static> BroadcastStream<T> {
    /// Subscribes to `cell`.
    ///
    /// # Parameters
    ///
    /// * `cell` - Broadcast whose later publishes are buffered for this stream
    pub fn new(cell: &Broadcast<T>) -> Self {
        let buffer = Rc::new(RefCell::new(Buffer {
            queue: VecDeque::new(),
            waker: None,
        }));

        let sink = Rc::clone(&buffer);
        let subscription = cell.subscribe(move |value: &T| {
            let waker = {
                let mut buffer = sink.borrow_mut();
                buffer.queue.push_back(value.clone());
                buffer.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake();
            }
        });

        Self {
            buffer,
            subscription,
        }
    }

    /// Number of values received but not yet polled.
    ///
    /// # Returns
    ///
    /// The buffer length; `0` right after a poll drains it.
    pub fn pending(&self) -> usize {
        self.buffer.borrow().queue.len()
    }
}

impl<T> Stream for BroadcastStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let mut buffer = self.buffer.borrow_mut();
        match buffer.queue.pop_front() {
            Some(value) => Poll::Ready(Some(value)),
            None => {
                buffer.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<T> Drop for BroadcastStream<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl<T> fmt::Debug for BroadcastStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastStream")
            .field("pending", &self.buffer.borrow().queue.len())
            .field("subscription", &self.subscription)
            .finish()
    }
}
