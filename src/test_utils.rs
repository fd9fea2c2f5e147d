//! Test utilities for fluent futures.
//!
//! This module provides shared helpers for unit tests:
//! - Consistent tracing-based logging initialization
//! - Phase/section macros for readable test output
//! - A manually drained executor for deterministic scheduling

use crate::executor::{Executor, Job, RejectedExecution};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// Executor that queues jobs until the test drains them.
///
/// Lets a test observe the state between "listener dispatched" and "listener
/// ran", which an inline or threaded executor cannot show.
#[derive(Clone, Default)]
pub struct ManualExecutor {
    queue: Arc<Mutex<VecDeque<Job>>>,
    closed: Arc<AtomicBool>,
}

impl ManualExecutor {
    /// Creates an empty, open queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an [`Executor`] feeding this queue.
    #[must_use]
    pub fn executor(&self) -> Executor {
        let queue = Arc::clone(&self.queue);
        let closed = Arc::clone(&self.closed);
        Executor::new(move |job: Job| -> Result<(), RejectedExecution> {
            if closed.load(Ordering::SeqCst) {
                return Err(RejectedExecution::new("manual executor closed"));
            }
            queue.lock().push_back(job);
            Ok(())
        })
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs the oldest queued job. Returns false if the queue was empty.
    pub fn run_next(&self) -> bool {
        let Some(job) = self.queue.lock().pop_front() else {
            return false;
        };
        job();
        true
    }

    /// Runs jobs until the queue is empty, including jobs queued meanwhile.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    /// Rejects every job submitted from now on.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for ManualExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualExecutor")
            .field("pending", &self.pending())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_runs_in_order_and_closes() {
        init_test_logging();
        crate::test_section!("manual executor");
        let manual = ManualExecutor::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            let log = Arc::clone(&log);
            manual
                .executor()
                .execute(Box::new(move || log.lock().push(id)))
                .expect("open");
        }
        assert_eq!(manual.pending(), 3);
        assert!(manual.run_next());
        assert_eq!(manual.run_all(), 2);
        let seen = log.lock().clone();
        crate::assert_with_log!(
            seen == vec![0, 1, 2],
            "jobs run in submission order",
            vec![0, 1, 2],
            seen
        );

        manual.close();
        assert!(manual.executor().execute(Box::new(|| {})).is_err());
        assert!(!manual.run_next());
    }
}
