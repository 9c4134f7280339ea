//! Futures completed by test code
//!
//! This module provides [`ControllableFuture`], a single-result handle that
//! behaves like the handle a real scheduler returns, except that it only
//! finishes when test code says so.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use testkit_scheduler::future::ControllableFuture;
//! use testkit_scheduler::Error;
//!
//! let future: ControllableFuture<u32> = ControllableFuture::new();
//!
//! // Nobody completed it yet
//! let timeout = Duration::from_millis(10);
//! assert_eq!(future.wait_timeout(timeout), Err(Error::Timeout(timeout)));
//!
//! // Cancellation wins, later completion is rejected
//! assert!(future.cancel());
//! assert!(!future.complete(1));
//! assert_eq!(future.wait(), Err(Error::Cancelled));
//! ```

mod controllable;
mod gate;

pub use controllable::{ControllableFuture, Delayed, FutureState, ScheduledHandle, Wait};
