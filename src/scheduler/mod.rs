//! Recording scheduler for tests
//!
//! This module provides the [`ScheduledExecutor`] trait production code is
//! written against, and [`StubScheduler`], an implementation that records
//! every call and never runs anything.
//!
//! - [`StubScheduler`] - Records one-shot and fixed-rate submissions
//! - [`FixedRateRecord`] - One recorded fixed-rate submission
//! - [`Task`] - Opaque reference to submitted work
//! - [`TimeUnit`] - Unit of delays and periods
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//! use testkit_scheduler::scheduler::{ScheduledExecutor, StubScheduler, Task, TimeUnit};
//!
//! let scheduler: StubScheduler<u32> = StubScheduler::new();
//!
//! // Production code schedules work and blocks on the handle
//! let producer = scheduler.clone();
//! let worker = thread::spawn(move || {
//!     let handle = producer.schedule_at_fixed_rate(Task::new(|| {}), 5, 10, TimeUnit::Seconds);
//!     handle.wait()
//! });
//!
//! // Test code finds the submission and completes it
//! let record = loop {
//!     if let Some(record) = scheduler.fixed_rate_record(0) {
//!         break record;
//!     }
//!     thread::yield_now();
//! };
//! assert_eq!(record.period, 10);
//! record.future.complete(42);
//!
//! assert_eq!(worker.join().unwrap(), Ok(42));
//! ```

mod executor;
mod stub;
mod task;

pub use executor::ScheduledExecutor;
pub use stub::{FixedRateRecord, OncePolicy, StubScheduler, StubSchedulerBuilder};
pub use task::{Task, TimeUnit};
