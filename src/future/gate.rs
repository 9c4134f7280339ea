//! One-shot release gate.
//!
//! A gate starts closed and is released exactly once with a value. Blocking
//! waiters park on a condition variable; async waiters register wakers, the
//! same way sync points hold wakers until they are released.

use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Shared state behind the gate lock.
struct GateState<V> {
    /// The released value, `None` while the gate is closed.
    value: Option<V>,
    /// Async waiters to wake on release, keyed by slot id.
    wakers: Vec<(u64, Waker)>,
    /// Next slot id handed to an async waiter.
    next_slot: u64,
}

/// A gate that blocks waiters until a single release event occurs.
pub(crate) struct Gate<V> {
    state: Mutex<GateState<V>>,
    released: Condvar,
}

impl<V> Gate<V> {
    /// Creates a closed gate.
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                value: None,
                wakers: Vec::new(),
                next_slot: 0,
            }),
            released: Condvar::new(),
        }
    }

    /// Releases the gate with `value`.
    ///
    /// Returns the value back if the gate was already released; the first
    /// release is the only one that takes effect.
    pub(crate) fn release(&self, value: V) -> Result<(), V> {
        let wakers = {
            let mut state = self.state.lock();
            if state.value.is_some() {
                return Err(value);
            }
            state.value = Some(value);
            self.released.notify_all();
            std::mem::take(&mut state.wakers)
        };
        for (_, waker) in wakers {
            waker.wake();
        }
        Ok(())
    }

    /// Returns `true` once the gate has been released.
    pub(crate) fn is_released(&self) -> bool {
        self.state.lock().value.is_some()
    }

    /// Inspects the released value without blocking.
    pub(crate) fn peek<R>(&self, f: impl FnOnce(Option<&V>) -> R) -> R {
        f(self.state.lock().value.as_ref())
    }

    /// Blocks until the gate is released, then maps the value.
    pub(crate) fn wait<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.value.as_ref() {
                return f(value);
            }
            self.released.wait(&mut state);
        }
    }

    /// Blocks until the gate is released or `timeout` elapses.
    ///
    /// Returns `None` only when the deadline passed with the gate closed.
    pub(crate) fn wait_timeout<R>(&self, timeout: Duration, f: impl FnOnce(&V) -> R) -> Option<R> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.value.as_ref() {
                return Some(f(value));
            }
            match deadline {
                Some(deadline) => {
                    if self.released.wait_until(&mut state, deadline).timed_out() {
                        return state.value.as_ref().map(f);
                    }
                }
                // Deadline beyond what Instant can represent.
                None => self.released.wait(&mut state),
            }
        }
    }

    /// Polls for release, registering the task's waker while closed.
    ///
    /// `slot` identifies this waiter's registration across polls. It is set
    /// on first registration and cleared once the gate is observed released.
    pub(crate) fn poll_released<R>(
        &self,
        cx: &mut Context<'_>,
        slot: &mut Option<u64>,
        f: impl FnOnce(&V) -> R,
    ) -> Poll<R> {
        let mut state = self.state.lock();
        if let Some(value) = state.value.as_ref() {
            *slot = None;
            return Poll::Ready(f(value));
        }
        let waker = cx.waker();
        if let Some(id) = *slot {
            if let Some((_, registered)) = state.wakers.iter_mut().find(|(s, _)| *s == id) {
                if !registered.will_wake(waker) {
                    registered.clone_from(waker);
                }
                return Poll::Pending;
            }
        }
        let id = state.next_slot;
        state.next_slot += 1;
        state.wakers.push((id, waker.clone()));
        *slot = Some(id);
        Poll::Pending
    }

    /// Drops the waker registered under `slot`, if still present.
    pub(crate) fn deregister(&self, slot: u64) {
        self.state.lock().wakers.retain(|(s, _)| *s != slot);
    }

    /// Returns the number of registered async waiters.
    pub(crate) fn waker_count(&self) -> usize {
        self.state.lock().wakers.len()
    }
}
