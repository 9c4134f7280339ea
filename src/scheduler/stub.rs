//! `StubScheduler` implementation.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::executor::ScheduledExecutor;
use super::task::{Task, TimeUnit};
use crate::future::ControllableFuture;

/// What [`StubScheduler::schedule`] hands back for one-shot work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OncePolicy {
    /// Return a pending [`ControllableFuture`] that only test code finishes.
    /// The same future is available from [`StubScheduler::last_once_future`].
    #[default]
    Pending,
    /// Return `None`.
    Absent,
}

/// A recorded fixed-rate submission.
#[derive(Clone, Debug)]
pub struct FixedRateRecord<T> {
    /// The submitted task.
    pub task: Task,
    /// Delay before the first run, in `unit`.
    pub initial_delay: u64,
    /// Time between runs, in `unit`.
    pub period: u64,
    /// Unit of `initial_delay` and `period`.
    pub unit: TimeUnit,
    /// The future returned to the caller.
    pub future: ControllableFuture<T>,
}

impl<T> FixedRateRecord<T> {
    /// The initial delay as a [`Duration`].
    #[must_use]
    pub fn initial_delay_duration(&self) -> Duration {
        self.unit.to_duration(self.initial_delay)
    }

    /// The period as a [`Duration`].
    #[must_use]
    pub fn period_duration(&self) -> Duration {
        self.unit.to_duration(self.period)
    }
}

/// Builder for [`StubScheduler`].
///
/// # Example
///
/// ```rust
/// use testkit_scheduler::scheduler::{OncePolicy, ScheduledExecutor, StubScheduler, Task, TimeUnit};
///
/// let scheduler: StubScheduler = StubScheduler::builder()
///     .once_policy(OncePolicy::Absent)
///     .build();
///
/// assert!(scheduler.schedule(Task::new(|| {}), 1, TimeUnit::Seconds).is_none());
/// ```
#[derive(Debug)]
pub struct StubSchedulerBuilder<T> {
    once_policy: OncePolicy,
    _result: PhantomData<fn() -> T>,
}

impl<T> StubSchedulerBuilder<T> {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            once_policy: OncePolicy::default(),
            _result: PhantomData,
        }
    }

    /// Sets what one-shot submissions return.
    #[must_use]
    pub fn once_policy(mut self, policy: OncePolicy) -> Self {
        self.once_policy = policy;
        self
    }

    /// Builds the scheduler.
    #[must_use]
    pub fn build(self) -> StubScheduler<T> {
        StubScheduler {
            inner: Arc::new(StubInner {
                once_policy: self.once_policy,
                submissions: AtomicUsize::new(0),
                shutdowns: AtomicUsize::new(0),
                calls: Mutex::new(CallLog::default()),
            }),
        }
    }
}

impl<T> Default for StubSchedulerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A scheduler that records submissions instead of running them.
///
/// Every call is recorded and returns immediately. Fixed-rate submissions
/// get a fresh [`ControllableFuture`] which is kept in
/// [`fixed_rate_records`](Self::fixed_rate_records), so a test can find the
/// exact handle production code is holding and finish it.
///
/// `T` is the value type carried by the returned futures.
///
/// # Thread Safety
///
/// `StubScheduler` can be cloned and shared across threads. All clones
/// record into the same state.
///
/// # Example
///
/// ```rust
/// use testkit_scheduler::scheduler::{ScheduledExecutor, StubScheduler, Task, TimeUnit};
///
/// let scheduler: StubScheduler<u32> = StubScheduler::new();
/// let task = Task::new(|| {});
///
/// let handle = scheduler.schedule_at_fixed_rate(task.clone(), 5, 10, TimeUnit::Seconds);
///
/// let records = scheduler.fixed_rate_records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].task, task);
///
/// // Finish the future production code is holding
/// assert!(records[0].future.complete(42));
/// assert_eq!(handle.wait(), Ok(42));
/// ```
pub struct StubScheduler<T = ()> {
    inner: Arc<StubInner<T>>,
}

struct StubInner<T> {
    once_policy: OncePolicy,
    /// One-shot submission count
    submissions: AtomicUsize,
    /// Shutdown call count
    shutdowns: AtomicUsize,
    calls: Mutex<CallLog<T>>,
}

struct CallLog<T> {
    last_delay: u64,
    last_unit: Option<TimeUnit>,
    last_task: Option<Task>,
    last_once: Option<ControllableFuture<T>>,
    fixed_rate: Vec<FixedRateRecord<T>>,
}

impl<T> Default for CallLog<T> {
    fn default() -> Self {
        Self {
            last_delay: 0,
            last_unit: None,
            last_task: None,
            last_once: None,
            fixed_rate: Vec::new(),
        }
    }
}

impl<T> StubScheduler<T> {
    /// Returns a builder for a scheduler whose futures carry `T`.
    #[must_use]
    pub fn builder() -> StubSchedulerBuilder<T> {
        StubSchedulerBuilder::new()
    }

    /// Creates a scheduler with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        StubSchedulerBuilder::new().build()
    }

    /// Creates a scheduler with the given one-shot policy.
    #[must_use]
    pub fn with_once_policy(policy: OncePolicy) -> Self {
        StubSchedulerBuilder::new().once_policy(policy).build()
    }

    /// Returns the configured one-shot policy.
    #[must_use]
    pub fn once_policy(&self) -> OncePolicy {
        self.inner.once_policy
    }

    /// Number of one-shot submissions.
    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.inner.submissions.load(Ordering::SeqCst)
    }

    /// Delay of the most recent one-shot submission, `0` before any.
    #[must_use]
    pub fn last_delay(&self) -> u64 {
        self.inner.calls.lock().last_delay
    }

    /// Unit of the most recent one-shot submission.
    #[must_use]
    pub fn last_unit(&self) -> Option<TimeUnit> {
        self.inner.calls.lock().last_unit
    }

    /// Task of the most recent one-shot submission.
    #[must_use]
    pub fn last_task(&self) -> Option<Task> {
        self.inner.calls.lock().last_task.clone()
    }

    /// Future returned by the most recent one-shot submission.
    ///
    /// Always `None` under [`OncePolicy::Absent`].
    #[must_use]
    pub fn last_once_future(&self) -> Option<ControllableFuture<T>> {
        self.inner.calls.lock().last_once.clone()
    }

    /// Number of [`shutdown`](ScheduledExecutor::shutdown) calls.
    #[must_use]
    pub fn shutdown_count(&self) -> usize {
        self.inner.shutdowns.load(Ordering::SeqCst)
    }

    /// Returns `true` if shutdown was called at least once.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_count() > 0
    }

    /// Number of fixed-rate submissions.
    #[must_use]
    pub fn fixed_rate_count(&self) -> usize {
        self.inner.calls.lock().fixed_rate.len()
    }

    /// Clears all recorded calls and counters.
    ///
    /// Futures already handed out are left as they are.
    pub fn reset(&self) {
        let mut calls = self.inner.calls.lock();
        *calls = CallLog::default();
        self.inner.submissions.store(0, Ordering::SeqCst);
        self.inner.shutdowns.store(0, Ordering::SeqCst);
    }
}

impl<T: Clone> StubScheduler<T> {
    /// Snapshot of all fixed-rate submissions, in submission order.
    ///
    /// The futures in the snapshot are the same instances returned to
    /// callers.
    #[must_use]
    pub fn fixed_rate_records(&self) -> Vec<FixedRateRecord<T>> {
        self.inner.calls.lock().fixed_rate.clone()
    }

    /// The `n`th fixed-rate submission (0-indexed).
    #[must_use]
    pub fn fixed_rate_record(&self, n: usize) -> Option<FixedRateRecord<T>> {
        self.inner.calls.lock().fixed_rate.get(n).cloned()
    }

    /// The most recent fixed-rate submission.
    #[must_use]
    pub fn last_fixed_rate_record(&self) -> Option<FixedRateRecord<T>> {
        self.inner.calls.lock().fixed_rate.last().cloned()
    }
}

impl<T: Clone> ScheduledExecutor for StubScheduler<T> {
    type Handle = ControllableFuture<T>;

    fn schedule(&self, task: Task, delay: u64, unit: TimeUnit) -> Option<Self::Handle> {
        let future = match self.inner.once_policy {
            OncePolicy::Pending => Some(ControllableFuture::new()),
            OncePolicy::Absent => None,
        };

        let mut calls = self.inner.calls.lock();
        calls.last_delay = delay;
        calls.last_unit = Some(unit);
        calls.last_task = Some(task);
        calls.last_once.clone_from(&future);
        let count = self.inner.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        drop(calls);

        tracing::debug!(delay, %unit, count, "one-shot task scheduled");
        future
    }

    fn schedule_at_fixed_rate(
        &self,
        task: Task,
        initial_delay: u64,
        period: u64,
        unit: TimeUnit,
    ) -> Self::Handle {
        let future = ControllableFuture::new();

        let index = {
            let mut calls = self.inner.calls.lock();
            calls.fixed_rate.push(FixedRateRecord {
                task,
                initial_delay,
                period,
                unit,
                future: future.clone(),
            });
            calls.fixed_rate.len() - 1
        };

        tracing::debug!(initial_delay, period, %unit, index, "fixed-rate task scheduled");
        future
    }

    fn shutdown(&self) {
        let count = self.inner.shutdowns.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(count, "stub scheduler shutdown requested");
    }
}

impl<T> Default for StubScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for StubScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for StubScheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let calls = self.inner.calls.lock();
        f.debug_struct("StubScheduler")
            .field("once_policy", &self.inner.once_policy)
            .field("submission_count", &self.submission_count())
            .field("last_delay", &calls.last_delay)
            .field("last_unit", &calls.last_unit)
            .field("shutdown_count", &self.shutdown_count())
            .field("fixed_rate_count", &calls.fixed_rate.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::thread;

    fn noop() -> Task {
        Task::new(|| {})
    }

    #[test]
    fn test_new_scheduler_is_empty() {
        let scheduler: StubScheduler = StubScheduler::new();

        assert_eq!(scheduler.submission_count(), 0);
        assert_eq!(scheduler.last_delay(), 0);
        assert!(scheduler.last_unit().is_none());
        assert!(scheduler.last_task().is_none());
        assert!(scheduler.last_once_future().is_none());
        assert_eq!(scheduler.shutdown_count(), 0);
        assert!(!scheduler.is_shutdown());
        assert!(scheduler.fixed_rate_records().is_empty());
        assert_eq!(scheduler.once_policy(), OncePolicy::Pending);
    }

    #[test]
    fn test_schedule_overwrites_last_values() {
        let scheduler: StubScheduler = StubScheduler::new();
        let first = noop();
        let second = noop();

        scheduler.schedule(first.clone(), 100, TimeUnit::Milliseconds);
        assert_eq!(scheduler.submission_count(), 1);
        assert_eq!(scheduler.last_delay(), 100);
        assert_eq!(scheduler.last_task(), Some(first));

        scheduler.schedule(second.clone(), 3, TimeUnit::Seconds);
        assert_eq!(scheduler.submission_count(), 2);
        assert_eq!(scheduler.last_delay(), 3);
        assert_eq!(scheduler.last_unit(), Some(TimeUnit::Seconds));
        assert_eq!(scheduler.last_task(), Some(second));
    }

    #[test]
    fn test_schedule_does_not_touch_fixed_rate_records() {
        let scheduler: StubScheduler = StubScheduler::new();

        scheduler.schedule(noop(), 1, TimeUnit::Seconds);
        scheduler.schedule(noop(), 2, TimeUnit::Seconds);

        assert_eq!(scheduler.fixed_rate_count(), 0);
    }

    #[test]
    fn test_schedule_pending_policy_returns_tracked_future() {
        let scheduler: StubScheduler<&str> = StubScheduler::new();

        let handle = scheduler.schedule(noop(), 1, TimeUnit::Seconds).unwrap();
        let tracked = scheduler.last_once_future().unwrap();

        assert!(ControllableFuture::ptr_eq(&handle, &tracked));
        assert!(!handle.is_done());

        tracked.complete("fired");
        assert_eq!(handle.wait(), Ok("fired"));
    }

    #[test]
    fn test_schedule_absent_policy_returns_none() {
        let scheduler: StubScheduler = StubScheduler::with_once_policy(OncePolicy::Absent);

        assert!(scheduler.schedule(noop(), 1, TimeUnit::Seconds).is_none());
        assert_eq!(scheduler.submission_count(), 1);
        assert_eq!(scheduler.last_delay(), 1);
        assert!(scheduler.last_once_future().is_none());
    }

    #[test]
    fn test_fixed_rate_records_in_order() {
        let scheduler: StubScheduler<i32> = StubScheduler::new();
        let tasks: Vec<Task> = (0..3).map(|_| noop()).collect();

        let handles: Vec<_> = tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let i = i as u64;
                scheduler.schedule_at_fixed_rate(task.clone(), i, i * 10, TimeUnit::Milliseconds)
            })
            .collect();

        let records = scheduler.fixed_rate_records();
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.task, tasks[i]);
            assert_eq!(record.initial_delay, i as u64);
            assert_eq!(record.period, i as u64 * 10);
            assert_eq!(record.unit, TimeUnit::Milliseconds);
            assert!(ControllableFuture::ptr_eq(&record.future, &handles[i]));
        }
    }

    #[test]
    fn test_fixed_rate_record_accessors() {
        let scheduler: StubScheduler = StubScheduler::new();
        scheduler.schedule_at_fixed_rate(noop(), 5, 10, TimeUnit::Seconds);
        scheduler.schedule_at_fixed_rate(noop(), 1, 2, TimeUnit::Minutes);

        let first = scheduler.fixed_rate_record(0).unwrap();
        assert_eq!(first.initial_delay_duration(), Duration::from_secs(5));
        assert_eq!(first.period_duration(), Duration::from_secs(10));

        let last = scheduler.last_fixed_rate_record().unwrap();
        assert_eq!(last.period_duration(), Duration::from_secs(120));
        assert!(scheduler.fixed_rate_record(2).is_none());
    }

    #[test]
    fn test_shutdown_only_counts() {
        let scheduler: StubScheduler = StubScheduler::new();
        let handle = scheduler.schedule_at_fixed_rate(noop(), 0, 1, TimeUnit::Seconds);

        scheduler.shutdown();
        scheduler.shutdown();

        assert_eq!(scheduler.shutdown_count(), 2);
        assert!(scheduler.is_shutdown());
        assert_eq!(scheduler.fixed_rate_count(), 1);
        assert_eq!(scheduler.submission_count(), 0);
        assert!(!handle.is_done());
    }

    #[test]
    fn test_clones_share_state() {
        let scheduler: StubScheduler = StubScheduler::new();
        let clone = scheduler.clone();

        clone.schedule(noop(), 7, TimeUnit::Seconds);
        clone.schedule_at_fixed_rate(noop(), 0, 1, TimeUnit::Seconds);
        clone.shutdown();

        assert_eq!(scheduler.submission_count(), 1);
        assert_eq!(scheduler.last_delay(), 7);
        assert_eq!(scheduler.fixed_rate_count(), 1);
        assert_eq!(scheduler.shutdown_count(), 1);
    }

    #[test]
    fn test_reset() {
        let scheduler: StubScheduler = StubScheduler::new();
        scheduler.schedule(noop(), 7, TimeUnit::Seconds);
        let handle = scheduler.schedule_at_fixed_rate(noop(), 0, 1, TimeUnit::Seconds);
        scheduler.shutdown();

        scheduler.reset();

        assert_eq!(scheduler.submission_count(), 0);
        assert_eq!(scheduler.last_delay(), 0);
        assert!(scheduler.last_task().is_none());
        assert_eq!(scheduler.fixed_rate_count(), 0);
        assert_eq!(scheduler.shutdown_count(), 0);
        assert!(handle.complete(()));
    }

    #[test]
    fn test_concurrent_submissions_are_not_lost() {
        let scheduler: StubScheduler = StubScheduler::new();

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let scheduler = scheduler.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        scheduler.schedule(noop(), 1, TimeUnit::Seconds);
                        scheduler.schedule_at_fixed_rate(noop(), 1, 1, TimeUnit::Seconds);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(scheduler.submission_count(), 400);
        assert_eq!(scheduler.fixed_rate_count(), 400);
    }

    #[test]
    fn test_cancel_through_record() {
        let scheduler: StubScheduler<i32> = StubScheduler::new();
        let handle = scheduler.schedule_at_fixed_rate(noop(), 0, 1, TimeUnit::Seconds);

        let record = scheduler.fixed_rate_record(0).unwrap();
        assert!(record.future.cancel());
        assert!(!handle.complete(1));
        assert_eq!(handle.wait(), Err(Error::Cancelled));
    }

    #[test]
    fn test_builder() {
        let scheduler: StubScheduler<u8> = StubSchedulerBuilder::new()
            .once_policy(OncePolicy::Absent)
            .build();
        assert_eq!(scheduler.once_policy(), OncePolicy::Absent);

        let unit: StubScheduler = StubScheduler::builder().build();
        assert_eq!(unit.once_policy(), OncePolicy::Pending);

        let typed = StubScheduler::<String>::builder()
            .once_policy(OncePolicy::Absent)
            .build();
        assert!(typed.schedule(noop(), 1, TimeUnit::Seconds).is_none());
        let handle = typed.schedule_at_fixed_rate(noop(), 0, 1, TimeUnit::Seconds);
        assert!(handle.complete("typed".to_string()));
    }

    #[test]
    fn test_debug() {
        let scheduler: StubScheduler = StubScheduler::new();
        scheduler.shutdown();

        let debug = format!("{scheduler:?}");
        assert!(debug.contains("StubScheduler"));
        assert!(debug.contains("shutdown_count: 1"));
    }
}
