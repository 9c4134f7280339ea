//! The scheduling capability production code depends on.

use super::task::{Task, TimeUnit};
use crate::future::ScheduledHandle;

/// A service that runs tasks once after a delay or repeatedly at a fixed
/// rate.
///
/// Production code should take `impl ScheduledExecutor` (or a generic
/// parameter) rather than a concrete scheduler, so tests can pass a
/// [`StubScheduler`](super::StubScheduler) and production can pass a real
/// timer-backed implementation.
///
/// # Example
///
/// ```rust
/// use testkit_scheduler::scheduler::{ScheduledExecutor, StubScheduler, Task, TimeUnit};
///
/// struct Heartbeat<E: ScheduledExecutor> {
///     executor: E,
/// }
///
/// impl<E: ScheduledExecutor> Heartbeat<E> {
///     fn start(&self) -> E::Handle {
///         self.executor
///             .schedule_at_fixed_rate(Task::new(|| {}), 0, 30, TimeUnit::Seconds)
///     }
/// }
///
/// let stub: StubScheduler = StubScheduler::new();
/// let heartbeat = Heartbeat { executor: stub.clone() };
/// heartbeat.start();
///
/// assert_eq!(stub.fixed_rate_count(), 1);
/// ```
pub trait ScheduledExecutor {
    /// Handle returned for scheduled work.
    type Handle: ScheduledHandle;

    /// Schedules `task` to run once after `delay`.
    ///
    /// Implementations may return `None` when they hand out no handle for
    /// one-shot work.
    fn schedule(&self, task: Task, delay: u64, unit: TimeUnit) -> Option<Self::Handle>;

    /// Schedules `task` to run after `initial_delay`, then every `period`.
    fn schedule_at_fixed_rate(
        &self,
        task: Task,
        initial_delay: u64,
        period: u64,
        unit: TimeUnit,
    ) -> Self::Handle;

    /// Stops accepting new work.
    fn shutdown(&self);
}
