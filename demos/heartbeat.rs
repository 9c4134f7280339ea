//! Example: Driving a scheduled component from test code
//!
//! A heartbeat monitor schedules a fixed-rate probe and blocks until the
//! first probe reports back. The stub scheduler records the submission, and
//! the "test" side finishes the exact future the monitor is blocked on.

use std::thread;
use std::time::Duration;

use testkit_scheduler::prelude::*;

/// Production component, written against the scheduling trait.
struct HeartbeatMonitor<E: ScheduledExecutor> {
    executor: E,
}

impl<E: ScheduledExecutor> HeartbeatMonitor<E> {
    fn start(&self) -> E::Handle {
        let probe = Task::new(|| println!("   probe tick"));
        self.executor
            .schedule_at_fixed_rate(probe, 0, 30, TimeUnit::Seconds)
    }

    fn first_beat(&self, handle: &E::Handle) -> Result<<E::Handle as ScheduledHandle>::Output> {
        handle.wait_timeout(Duration::from_secs(5))
    }
}

fn main() {
    println!("🧰 testkit-scheduler - Controllable Futures\n");

    example_complete_from_test();
    example_cancel_wins();
    example_timeout();

    println!("\n✅ All heartbeat examples completed!");
}

/// Test code completes the future the monitor is blocked on
fn example_complete_from_test() {
    println!("📌 Example 1: Complete from another thread");

    let scheduler: StubScheduler<u32> = StubScheduler::new();
    let monitor = HeartbeatMonitor {
        executor: scheduler.clone(),
    };
    let handle = monitor.start();

    let record = scheduler.fixed_rate_record(0).expect("probe was scheduled");
    println!(
        "   Recorded: initial delay {}, period {:?}",
        record.initial_delay,
        record.period_duration()
    );

    let driver = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        record.future.complete(200)
    });

    let beat = monitor.first_beat(&handle);
    println!("   Monitor woke up with {beat:?}");
    assert_eq!(beat, Ok(200));
    assert!(driver.join().unwrap_or(false));
    println!();
}

/// Cancelling first makes a late completion a no-op
fn example_cancel_wins() {
    println!("📌 Example 2: Cancel wins the race");

    let scheduler: StubScheduler<u32> = StubScheduler::new();
    let monitor = HeartbeatMonitor {
        executor: scheduler.clone(),
    };
    let handle = monitor.start();

    let record = scheduler.last_fixed_rate_record().expect("probe was scheduled");
    let future = &record.future;
    println!("   cancel()   -> {}", future.cancel());
    println!("   complete() -> {}", future.complete(200));

    assert_eq!(monitor.first_beat(&handle), Err(Error::Cancelled));
    scheduler.shutdown();
    println!("   shutdown calls: {}", scheduler.shutdown_count());
    println!();
}

/// Nobody finishes the future, so a bounded wait times out
fn example_timeout() {
    println!("📌 Example 3: Bounded wait on an abandoned future");

    let scheduler: StubScheduler<u32> = StubScheduler::new();
    let handle = scheduler.schedule_at_fixed_rate(Task::new(|| {}), 0, 1, TimeUnit::Seconds);

    let result = handle.wait_timeout(Duration::from_millis(100));
    println!("   wait_timeout(100ms) -> {result:?}");
    assert!(matches!(result, Err(Error::Timeout(_))));
}
