//! # Shared Queue
//!
//! An unbounded, closeable FIFO that hands each item to exactly one receiver.
//!
//! ## Wake-up policy
//!
//! - [`SharedQueue::push`] wakes **one** waiter: any single waiter can take
//!   the new item, so waking all of them only produces contention.
//! - A stop request on the injected [`CancellationToken`] wakes **all**
//!   waiters so that each re-evaluates its predicate and leaves.
//!
//! ## Close semantics
//!
//! After the token stops, [`SharedQueue::pop`] keeps handing out queued items
//! in order and reports [`Popped::Closed`] only once the queue is empty
//! ("drain to empty"). Pushes after the stop are refused, so nothing that
//! was accepted is silently lost.
//!
//! The stop hook takes the queue lock before notifying. A waiter either sees
//! the stopped flag when it checks its predicate or is already parked when
//! the notification arrives, so no waiter can sleep through shutdown.

use crate::framework::cancel::{CancellationToken, StopListener};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use tracing::trace;

/// Result of a blocking [`SharedQueue::pop`].
#[derive(Debug, PartialEq)]
pub enum Popped<T> {
    /// The oldest queued item.
    Item(T),
    /// The queue is empty and the token has stopped. Terminal.
    Closed,
}

struct QueueInner<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> QueueInner<T> {
    // The deque is never observed mid-mutation, so a poisoned lock is safe
    // to keep using.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Send> StopListener for QueueInner<T> {
    fn on_stop(&self) {
        let _items = self.lock();
        self.available.notify_all();
    }
}

/// Thread-safe FIFO shared by one producer and a pool of consumers.
pub struct SharedQueue<T> {
    inner: Arc<QueueInner<T>>,
    token: CancellationToken,
}

impl<T: Send + 'static> SharedQueue<T> {
    /// Creates an empty queue bound to `token`.
    pub fn new(token: CancellationToken) -> Self {
        let inner = Arc::new(QueueInner {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        });
        let listener: Weak<dyn StopListener> = Arc::downgrade(&inner) as Weak<dyn StopListener>;
        token.register(listener);
        Self { inner, token }
    }
}

impl<T> SharedQueue<T> {
    /// Appends to the tail and wakes one waiting receiver. Never blocks
    /// beyond the O(1) critical section.
    ///
    /// Once the token has stopped the push is refused and the item handed
    /// back. The check runs under the queue lock, the same lock the stop hook
    /// and [`pop`](Self::pop) take, so an accepted item is always queued
    /// before any receiver can decide the queue is closed.
    pub fn push(&self, item: T) -> Result<(), T> {
        let len = {
            let mut items = self.inner.lock();
            if self.token.is_stopped() {
                return Err(item);
            }
            items.push_back(item);
            items.len()
        };
        self.inner.available.notify_one();
        trace!(queue_len = len, "Pushed");
        Ok(())
    }

    /// Blocks until an item is available or the queue is closed.
    ///
    /// Queued items are returned in push order even after the token has
    /// stopped; [`Popped::Closed`] is returned only when nothing is left.
    pub fn pop(&self) -> Popped<T> {
        let mut items = self.inner.lock();
        loop {
            if let Some(item) = items.pop_front() {
                trace!(queue_len = items.len(), "Popped");
                return Popped::Item(item);
            }
            if self.token.is_stopped() {
                return Popped::Closed;
            }
            items = self
                .inner
                .available
                .wait(items)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Removes and returns everything still queued.
    pub fn drain_remaining(&self) -> Vec<T> {
        self.inner.lock().drain(..).collect()
    }
}

impl<T> Clone for SharedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: self.token.clone(),
        }
    }
}
