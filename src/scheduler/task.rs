//! Task references and time units carried by scheduling calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// An opaque reference to a unit of work.
///
/// Cloning a `Task` clones the reference, not the work: clones compare
/// equal, and [`Task::ptr_eq`] tells whether two tasks are the same
/// submission. The stub scheduler records tasks but never runs them.
#[derive(Clone)]
pub struct Task(Arc<dyn Fn() + Send + Sync>);

impl Task {
    /// Wraps a callable as a task.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_scheduler::scheduler::Task;
    ///
    /// let task = Task::new(|| println!("tick"));
    /// let same = task.clone();
    /// assert!(Task::ptr_eq(&task, &same));
    /// ```
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    /// Runs the task on the calling thread.
    pub fn run(&self) {
        (self.0)();
    }

    /// Returns `true` if both references point at the same task.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        Task::ptr_eq(self, other)
    }
}

impl Eq for Task {}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

/// Unit attached to delays and periods in scheduling calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Nanoseconds.
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    Days,
}

impl TimeUnit {
    /// Converts `amount` of this unit into a [`Duration`], saturating on
    /// overflow.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use testkit_scheduler::scheduler::TimeUnit;
    ///
    /// assert_eq!(TimeUnit::Minutes.to_duration(2), Duration::from_secs(120));
    /// ```
    #[must_use]
    pub fn to_duration(self, amount: u64) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(amount),
            TimeUnit::Microseconds => Duration::from_micros(amount),
            TimeUnit::Milliseconds => Duration::from_millis(amount),
            TimeUnit::Seconds => Duration::from_secs(amount),
            TimeUnit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            TimeUnit::Hours => Duration::from_secs(amount.saturating_mul(60 * 60)),
            TimeUnit::Days => Duration::from_secs(amount.saturating_mul(24 * 60 * 60)),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Nanoseconds => "NANOSECONDS",
            TimeUnit::Microseconds => "MICROSECONDS",
            TimeUnit::Milliseconds => "MILLISECONDS",
            TimeUnit::Seconds => "SECONDS",
            TimeUnit::Minutes => "MINUTES",
            TimeUnit::Hours => "HOURS",
            TimeUnit::Days => "DAYS",
        };
        f.write_str(name)
    }
}
