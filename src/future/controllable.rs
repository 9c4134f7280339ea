//! `ControllableFuture` implementation.

use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_core::future::FusedFuture;

use super::gate::Gate;
use crate::error::{Error, Result};

/// How a future left the pending state.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Outcome<T> {
    Completed(T),
    Cancelled,
    Failed(String),
}

impl<T: Clone> Outcome<T> {
    fn to_result(&self) -> Result<T> {
        match self {
            Outcome::Completed(value) => Ok(value.clone()),
            Outcome::Cancelled => Err(Error::Cancelled),
            Outcome::Failed(message) => Err(Error::Failed(message.clone())),
        }
    }
}

/// Snapshot of a [`ControllableFuture`]'s state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FutureState<T> {
    /// No value has been supplied yet.
    Pending,
    /// Completed with a value.
    Completed(T),
    /// Cancelled before completion.
    Cancelled,
    /// Failed with a message.
    Failed(String),
}

impl<T> FutureState<T> {
    /// Returns `true` unless the state is [`FutureState::Pending`].
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, FutureState::Pending)
    }
}

impl<T> fmt::Display for FutureState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FutureState::Pending => write!(f, "Pending"),
            FutureState::Completed(_) => write!(f, "Completed"),
            FutureState::Cancelled => write!(f, "Cancelled"),
            FutureState::Failed(_) => write!(f, "Failed"),
        }
    }
}

/// Something with a (possibly fake) remaining scheduling delay.
pub trait Delayed {
    /// Time left before the associated work is due.
    fn delay_remaining(&self) -> Duration;

    /// Orders two delayed items by remaining delay.
    fn compare_delay(&self, other: &dyn Delayed) -> Ordering {
        self.delay_remaining().cmp(&other.delay_remaining())
    }
}

/// Operations production code may use on a handle returned by a scheduler.
pub trait ScheduledHandle: Delayed {
    /// Value the scheduled work produces.
    type Output;

    /// Blocks until the work is finished.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the work was cancelled and
    /// [`Error::Failed`] if it failed.
    fn wait(&self) -> Result<Self::Output>;

    /// Blocks for at most `timeout` waiting for the work to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the work is still pending after
    /// `timeout`, otherwise the same errors as [`wait`](Self::wait).
    fn wait_timeout(&self, timeout: Duration) -> Result<Self::Output>;

    /// Attempts to cancel the scheduled work.
    ///
    /// Returns `true` if this call performed the cancellation.
    fn cancel(&self) -> bool;

    /// Returns `true` if the work was cancelled.
    fn is_cancelled(&self) -> bool;

    /// Returns `true` once the work completed, failed or was cancelled.
    fn is_done(&self) -> bool;
}

/// A future whose result is supplied by test code instead of elapsed time.
///
/// Production code holds one clone and blocks in [`wait`](Self::wait) (or
/// awaits [`wait_async`](Self::wait_async)); test code holds another and
/// decides when, and how, it finishes. The first of
/// [`complete`](Self::complete), [`cancel`](Self::cancel) or
/// [`fail`](Self::fail) wins; every later attempt returns `false`.
///
/// # Thread Safety
///
/// All clones share one state and may be used from any thread.
///
/// # Example
///
/// ```rust
/// use std::thread;
/// use testkit_scheduler::future::ControllableFuture;
///
/// let future: ControllableFuture<i32> = ControllableFuture::new();
/// let handle = future.clone();
///
/// let waiter = thread::spawn(move || handle.wait());
///
/// assert!(future.complete(42));
/// assert!(!future.cancel());
/// assert_eq!(waiter.join().unwrap(), Ok(42));
/// ```
pub struct ControllableFuture<T> {
    gate: Arc<Gate<Outcome<T>>>,
}

impl<T> ControllableFuture<T> {
    /// Creates a new pending future.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Gate::new()),
        }
    }

    fn finish(&self, outcome: Outcome<T>, action: &'static str) -> bool {
        let won = self.gate.release(outcome).is_ok();
        if won {
            tracing::debug!(future = ?Arc::as_ptr(&self.gate), action, "controllable future finalized");
        } else {
            tracing::trace!(future = ?Arc::as_ptr(&self.gate), action, "future already finalized, ignoring");
        }
        won
    }

    /// Completes the future with `value`, releasing every waiter.
    ///
    /// Returns `false`, dropping `value`, if the future was already
    /// completed, cancelled or failed.
    pub fn complete(&self, value: T) -> bool {
        self.finish(Outcome::Completed(value), "complete")
    }

    /// Cancels the future, releasing every waiter.
    ///
    /// Returns `false` if the future was already finalized.
    pub fn cancel(&self) -> bool {
        self.finish(Outcome::Cancelled, "cancel")
    }

    /// Fails the future, so waiters receive [`Error::Failed`].
    ///
    /// Returns `false` if the future was already finalized.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.finish(Outcome::Failed(message.into()), "fail")
    }

    /// Returns `true` if the future was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.gate.peek(|o| matches!(o, Some(Outcome::Cancelled)))
    }

    /// Returns `true` if the future was completed with a value.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.gate.peek(|o| matches!(o, Some(Outcome::Completed(_))))
    }

    /// Returns `true` if the future was failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.gate.peek(|o| matches!(o, Some(Outcome::Failed(_))))
    }

    /// Returns `true` once the future has left the pending state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.gate.is_released()
    }

    /// Number of async waiters currently parked on this future.
    #[must_use]
    pub fn async_waiters(&self) -> usize {
        self.gate.waker_count()
    }

    /// Returns `true` if both handles refer to the same future.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.gate, &b.gate)
    }
}

impl<T: Clone> ControllableFuture<T> {
    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FutureState<T> {
        self.gate.peek(|o| match o {
            None => FutureState::Pending,
            Some(Outcome::Completed(value)) => FutureState::Completed(value.clone()),
            Some(Outcome::Cancelled) => FutureState::Cancelled,
            Some(Outcome::Failed(message)) => FutureState::Failed(message.clone()),
        })
    }

    /// Returns the outcome without blocking, or `None` while pending.
    #[must_use]
    pub fn try_get(&self) -> Option<Result<T>> {
        self.gate.peek(|o| o.map(Outcome::to_result))
    }

    /// Blocks the current thread until the future is finalized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the future was cancelled and
    /// [`Error::Failed`] if it was failed.
    pub fn wait(&self) -> Result<T> {
        self.gate.wait(Outcome::to_result)
    }

    /// Blocks the current thread for at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the future is still pending once
    /// `timeout` has elapsed, otherwise the same errors as
    /// [`wait`](Self::wait).
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T> {
        self.gate
            .wait_timeout(timeout, Outcome::to_result)
            .unwrap_or_else(|| {
                tracing::debug!(?timeout, "wait on controllable future timed out");
                Err(Error::Timeout(timeout))
            })
    }

    /// Returns a future that resolves once this future is finalized.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_scheduler::future::ControllableFuture;
    ///
    /// let future = ControllableFuture::new();
    /// future.complete("ready");
    ///
    /// let value = futures::executor::block_on(future.wait_async());
    /// assert_eq!(value, Ok("ready"));
    /// ```
    #[must_use]
    pub fn wait_async(&self) -> Wait<T> {
        Wait {
            future: self.clone(),
            slot: None,
            terminated: false,
        }
    }
}

impl<T> Default for ControllableFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ControllableFuture<T> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<T> Delayed for ControllableFuture<T> {
    fn delay_remaining(&self) -> Duration {
        Duration::ZERO
    }

    fn compare_delay(&self, _other: &dyn Delayed) -> Ordering {
        Ordering::Equal
    }
}

impl<T: Clone> ScheduledHandle for ControllableFuture<T> {
    type Output = T;

    fn wait(&self) -> Result<T> {
        ControllableFuture::wait(self)
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<T> {
        ControllableFuture::wait_timeout(self, timeout)
    }

    fn cancel(&self) -> bool {
        ControllableFuture::cancel(self)
    }

    fn is_cancelled(&self) -> bool {
        ControllableFuture::is_cancelled(self)
    }

    fn is_done(&self) -> bool {
        ControllableFuture::is_done(self)
    }
}

impl<T> fmt::Debug for ControllableFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.gate.peek(|o| match o {
            None => "Pending",
            Some(Outcome::Completed(_)) => "Completed",
            Some(Outcome::Cancelled) => "Cancelled",
            Some(Outcome::Failed(_)) => "Failed",
        });
        f.debug_struct("ControllableFuture")
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

/// Future returned by [`ControllableFuture::wait_async`].
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Wait<T> {
    future: ControllableFuture<T>,
    /// Waker registration on the gate, while pending.
    slot: Option<u64>,
    terminated: bool,
}

impl<T: Clone> Future for Wait<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let poll = this
            .future
            .gate
            .poll_released(cx, &mut this.slot, Outcome::to_result);
        if poll.is_ready() {
            this.terminated = true;
        }
        poll
    }
}

impl<T> Drop for Wait<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.future.gate.deregister(slot);
        }
    }
}

impl<T: Clone> FusedFuture for Wait<T> {
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}
