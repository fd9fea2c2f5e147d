//! Factory helpers for common futures.

use crate::error::Failure;
use crate::executor::Executor;
use crate::future::FluentFuture;
use crate::promise::Promise;
use crate::task::FutureTask;
use crate::tracing_compat::error;

/// Returns a future that has already succeeded with `value`.
#[must_use]
pub fn immediate<T: Clone + Send + 'static>(value: T) -> FluentFuture<T> {
    let promise = Promise::new();
    promise.set(value);
    promise.future()
}

/// Returns a future that has already failed with `failure`.
#[must_use]
pub fn immediate_failed<T: Clone + Send + 'static>(failure: impl Into<Failure>) -> FluentFuture<T> {
    let promise = Promise::new();
    promise.set_failure(failure);
    promise.future()
}

/// Returns a future that is already cancelled.
#[must_use]
pub fn immediate_cancelled<T: Clone + Send + 'static>() -> FluentFuture<T> {
    let promise = Promise::new();
    promise.cancel();
    promise.future()
}

/// Runs `computation` on `executor` and returns its future.
///
/// If the executor refuses the work, the returned future fails with the
/// [`RejectedExecution`](crate::executor::RejectedExecution).
pub fn submit<T, E, F>(executor: &Executor, computation: F) -> FluentFuture<T>
where
    T: Clone + Send + 'static,
    E: Into<Failure>,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let task = FutureTask::new(computation);
    let future = task.future();
    if let Err(rejected) = executor.execute(task.clone().into_job()) {
        error!(error = %rejected, "executor rejected submitted task");
        task.fail(rejected.into());
    }
    future
}
