//! # Cancellation Token
//!
//! A monotonic, process-wide stop signal that is *injected* into every actor
//! at construction instead of living in a global.
//!
//! The token moves from running to stopped exactly once. Readers get a
//! lock-free [`CancellationToken::is_running`] check; sleepers get
//! [`CancellationToken::sleep`], which returns early on stop; and blocking
//! structures (the [`SharedQueue`](crate::framework::SharedQueue)) register a
//! [`StopListener`] so a stop request can wake their waiters while holding
//! their own lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Hook invoked once when the token transitions to stopped.
///
/// Implementors must wake every thread they have parked on the token's
/// behalf. The token only keeps a weak reference, so a listener that has been
/// dropped is skipped.
pub trait StopListener: Send + Sync {
    fn on_stop(&self);
}

struct TokenState {
    stopped: bool,
    listeners: Vec<Weak<dyn StopListener>>,
}

struct Inner {
    stopped: AtomicBool,
    state: Mutex<TokenState>,
    sleepers: Condvar,
}

/// Shared handle to the stop signal. Cloning is cheap and every clone
/// observes the same state.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                stopped: AtomicBool::new(false),
                state: Mutex::new(TokenState {
                    stopped: false,
                    listeners: Vec::new(),
                }),
                sleepers: Condvar::new(),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.is_stopped()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Flips the token to stopped and wakes everything waiting on it.
    ///
    /// Returns `true` only for the call that performed the transition; every
    /// later call is a no-op.
    pub fn request_stop(&self) -> bool {
        let listeners = {
            let mut state = self.lock_state();
            if state.stopped {
                debug!("Stop already requested");
                return false;
            }
            state.stopped = true;
            self.inner.stopped.store(true, Ordering::Release);
            std::mem::take(&mut state.listeners)
        };
        self.inner.sleepers.notify_all();

        // Listeners take their own locks; run them outside ours.
        let mut woken = 0;
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener.on_stop();
            woken += 1;
        }
        info!(listeners = woken, "Stop requested");
        true
    }

    /// Registers a listener to be called on stop.
    ///
    /// If the token is already stopped the listener runs immediately.
    pub fn register(&self, listener: Weak<dyn StopListener>) {
        let mut state = self.lock_state();
        if state.stopped {
            drop(state);
            if let Some(listener) = listener.upgrade() {
                listener.on_stop();
            }
            return;
        }
        state.listeners.retain(|l| l.strong_count() > 0);
        state.listeners.push(listener);
    }

    /// Sleeps for up to `duration`, waking early if a stop is requested.
    ///
    /// Returns `true` if the full duration elapsed while still running.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut state = self.lock_state();
        loop {
            if state.stopped {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            state = match self.inner.sleepers.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    // The guarded state is a flag and a list; a panic elsewhere cannot leave
    // it half-updated, so poisoning is ignored.
    fn lock_state(&self) -> MutexGuard<'_, TokenState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
