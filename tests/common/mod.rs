#![allow(dead_code)]
//! Shared integration test utilities.

use std::sync::Once;
use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::ProptestConfig;
use testkit_scheduler::scheduler::{FixedRateRecord, StubScheduler};

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging once per test binary.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Property test config with a fixed case count.
#[must_use]
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    ProptestConfig::with_cases(cases)
}

/// Spins until the scheduler holds the `n`th fixed-rate record.
///
/// # Panics
///
/// Panics if the record does not show up within five seconds.
pub fn wait_for_fixed_rate<T: Clone>(scheduler: &StubScheduler<T>, n: usize) -> FixedRateRecord<T> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(record) = scheduler.fixed_rate_record(n) {
            return record;
        }
        assert!(Instant::now() < deadline, "fixed-rate record {n} never appeared");
        thread::sleep(Duration::from_millis(1));
    }
}
