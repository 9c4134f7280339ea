//! # testkit-scheduler
//!
//! > A deterministic stand-in for scheduling services in tests
//!
//! **testkit-scheduler** records the work production code schedules and
//! hands back futures that only finish when test code says so. No timers,
//! no background threads, no waiting on the wall clock.
//!
//! ## Quick Start
//!
//! ```rust
//! use testkit_scheduler::prelude::*;
//!
//! let scheduler: StubScheduler<i32> = StubScheduler::new();
//!
//! let handle = scheduler.schedule_at_fixed_rate(Task::new(|| {}), 5, 10, TimeUnit::Seconds);
//!
//! let record = scheduler.fixed_rate_record(0).unwrap();
//! assert_eq!((record.initial_delay, record.period), (5, 10));
//!
//! record.future.complete(42);
//! assert_eq!(handle.wait(), Ok(42));
//! ```
//!
//! ## Features
//!
//! - **Controllable Futures** - Complete, cancel or fail on demand
//! - **Stub Scheduler** - Records one-shot and fixed-rate submissions
//! - **Blocking and async waits** - `wait`, `wait_timeout`, `wait_async`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod future;
pub mod scheduler;

/// Prelude for convenient imports
///
/// ```rust
/// use testkit_scheduler::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::future::{ControllableFuture, Delayed, FutureState, ScheduledHandle};
    pub use crate::scheduler::{
        FixedRateRecord, OncePolicy, ScheduledExecutor, StubScheduler, Task, TimeUnit,
    };
}

// Re-exports
pub use error::{Error, Result};
