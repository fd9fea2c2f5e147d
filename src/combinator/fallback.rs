//! Fallback combinators: recover from a failed source.
//!
//! Success and cancellation pass through unchanged; the fallback is only
//! consulted for a failure. If the fallback itself fails, the derived future
//! fails with that new failure and the original one is dropped.

use super::{adopt, cancel_upstream, completed_outcome, run_step};
use crate::error::Failure;
use crate::executor::Executor;
use crate::future::FluentFuture;
use crate::outcome::{catch, Outcome};
use crate::promise::Promise;

/// Derives a future that replaces a failure with `fallback(failure)`.
pub fn with_fallback<T, E, F>(source: &FluentFuture<T>, executor: &Executor, fallback: F) -> FluentFuture<T>
where
    T: Clone + Send + 'static,
    E: Into<Failure>,
    F: FnOnce(Failure) -> Result<T, E> + Send + 'static,
{
    recover(source, executor, move |p: &Promise<T>, failure| {
        p.complete(catch(move || fallback(failure)));
    })
}

/// Derives a future that replaces a failure with the outcome of the future
/// `fallback(failure)` returns.
pub fn with_fallback_async<T, E, F>(
    source: &FluentFuture<T>,
    executor: &Executor,
    fallback: F,
) -> FluentFuture<T>
where
    T: Clone + Send + 'static,
    E: Into<Failure>,
    F: FnOnce(Failure) -> Result<FluentFuture<T>, E> + Send + 'static,
{
    recover(source, executor, move |p: &Promise<T>, failure| {
        match catch(move || fallback(failure)) {
            Outcome::Ok(replacement) => adopt(p, &replacement),
            Outcome::Err(failed) => {
                p.set_failure(failed);
            }
            Outcome::Cancelled => {
                p.cancel();
            }
        }
    })
}

fn recover<T, R>(source: &FluentFuture<T>, executor: &Executor, recovery: R) -> FluentFuture<T>
where
    T: Clone + Send + 'static,
    R: FnOnce(&Promise<T>, Failure) + Send + 'static,
{
    let promise = Promise::new();
    let derived = promise.future();
    let target = promise.clone();
    let reader = source.clone();
    let executor = executor.clone();
    source.add_listener(
        move || match completed_outcome(&reader) {
            Outcome::Err(failure) => run_step(&executor, &target, move |p| recovery(p, failure)),
            passed => {
                target.complete(passed);
            }
        },
        &Executor::INLINE,
    );
    cancel_upstream(&promise, source);
    derived
}
