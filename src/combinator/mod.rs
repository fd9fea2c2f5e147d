//! Combinators that derive new futures from existing ones.
//!
//! - [`transform`](mod@transform): map a success value, synchronously or by
//!   chaining another future
//! - [`fallback`]: recover from a failure with a value or another future
//! - [`callback`]: side-effect registration, no derived future
//! - [`checked`]: blocking accessors with a caller-chosen error type
//! - [`combine`](mod@combine): ordered aggregation of many futures
//!
//! Every combinator is built the same way: a [`Promise`] owns the derived
//! future, an inline listener on the source decides what happens, and only
//! user functions are handed to the caller's [`Executor`]. Failure and
//! cancellation pass through on the completing thread.
//!
//! # Cancellation
//!
//! Cancelling a derived future cancels its source(s). The derived future keeps
//! its source alive through that listener, and the source keeps the derived
//! future alive through its own listener. Both links are dropped when either
//! side completes.

pub mod callback;
pub mod checked;
pub mod combine;
pub mod fallback;
pub mod transform;

pub use callback::{add_callback, FutureCallback, OnFailure, OnSuccess};
pub use checked::CheckedFuture;
pub use combine::{combine, combine_on};
pub use fallback::{with_fallback, with_fallback_async};
pub use transform::{transform, transform_async};

use crate::error::Failure;
use crate::executor::{Executor, Job};
use crate::future::FluentFuture;
use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::tracing_compat::error;

/// Reads the outcome of a future whose listener has fired.
pub(crate) fn completed_outcome<T: Clone + Send + 'static>(source: &FluentFuture<T>) -> Outcome<T> {
    source.try_outcome().unwrap_or_else(|| {
        Outcome::Err(Failure::msg(
            "future source reported completion without an outcome",
        ))
    })
}

/// Hands a combinator step to `executor`.
///
/// The step is skipped if the derived future is already terminal (typically
/// cancelled) by the time it runs. A rejected step fails the derived future.
pub(crate) fn run_step<U, S>(executor: &Executor, promise: &Promise<U>, step: S)
where
    U: Clone + Send + 'static,
    S: FnOnce(&Promise<U>) + Send + 'static,
{
    if promise.is_done() {
        return;
    }
    let target = promise.clone();
    let job: Job = Box::new(move || {
        if !target.is_done() {
            step(&target);
        }
    });
    if let Err(rejected) = executor.execute(job) {
        error!(error = %rejected, "executor rejected combinator step");
        promise.set_failure(rejected);
    }
}

/// Cancels `source` when the future owned by `derived` ends cancelled.
pub(crate) fn cancel_upstream<T, U>(derived: &Promise<U>, source: &FluentFuture<T>)
where
    T: Clone + Send + 'static,
    U: Clone + Send + 'static,
{
    let derived_future = derived.future();
    let observer = derived_future.downgrade();
    let source = source.clone();
    derived_future.add_listener(
        move || {
            if observer.upgrade().is_some_and(|d| d.is_cancelled()) {
                source.cancel();
            }
        },
        &Executor::INLINE,
    );
}

/// Completes `promise` with whatever `inner` ends with.
pub(crate) fn adopt<U: Clone + Send + 'static>(promise: &Promise<U>, inner: &FluentFuture<U>) {
    let target = promise.clone();
    let reader = inner.clone();
    inner.add_listener(
        move || {
            target.complete(completed_outcome(&reader));
        },
        &Executor::INLINE,
    );
    cancel_upstream(promise, inner);
}

/// Converts the non-success outcomes of one future type into another's.
///
/// Returns the value back as `Ok` for the caller to handle.
pub(crate) fn split<T, U>(outcome: Outcome<T>) -> Result<T, Outcome<U>> {
    match outcome {
        Outcome::Ok(value) => Ok(value),
        Outcome::Err(failure) => Err(Outcome::Err(failure)),
        Outcome::Cancelled => Err(Outcome::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RejectedExecution;
    use crate::test_utils::{init_test_logging, ManualExecutor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn run_step_skips_terminal_promise() {
        init_test_logging();
        let manual = ManualExecutor::new();
        let promise = Promise::<u8>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        run_step(&manual.executor(), &promise, move |p| {
            counter.fetch_add(1, Ordering::SeqCst);
            p.set(1);
        });
        promise.cancel();
        manual.run_all();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(promise.future().is_cancelled());
    }

    #[test]
    fn run_step_rejection_fails_promise() {
        init_test_logging();
        let closed = Executor::new(|_job: Job| -> Result<(), RejectedExecution> {
            Err(RejectedExecution::new("closed"))
        });
        let promise = Promise::<u8>::new();
        run_step(&closed, &promise, |p| {
            p.set(1);
        });
        let err = promise.future().get().expect_err("rejected");
        assert!(err
            .cause()
            .and_then(|c| c.downcast_ref::<RejectedExecution>())
            .is_some());
    }

    #[test]
    fn cancel_upstream_only_on_cancellation() {
        let source = Promise::<u8>::new();
        let derived = Promise::<u8>::new();
        cancel_upstream(&derived, &source.future());
        derived.set(2);
        assert!(!source.future().is_done());

        let derived = Promise::<u8>::new();
        cancel_upstream(&derived, &source.future());
        derived.cancel();
        assert!(source.future().is_cancelled());
    }

    #[test]
    fn adopt_follows_inner_outcome() {
        let inner = Promise::new();
        let outer = Promise::new();
        adopt(&outer, &inner.future());
        assert!(!outer.is_done());
        inner.set("inner");
        assert_eq!(outer.future().get().expect("adopted"), "inner");
    }

    #[test]
    fn split_keeps_failure_identity() {
        let failure = Failure::msg("kept");
        let out = split::<u8, String>(Outcome::Err(failure.clone())).expect_err("not ok");
        assert!(Failure::ptr_eq(out.failure().expect("failure"), &failure));
        assert!(split::<u8, String>(Outcome::Cancelled)
            .expect_err("not ok")
            .is_cancelled());
        assert_eq!(split::<u8, String>(Outcome::Ok(4)).ok(), Some(4));
    }
}
