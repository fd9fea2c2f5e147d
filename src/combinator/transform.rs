//! Transform combinators: map a success value into a derived future.
//!
//! ```text
//!   source ── Ok(v) ──► executor ──► f(v) ──► derived
//!          ── Err(e) ─────────────────────────► derived = Err(e)
//!          ── Cancelled ──────────────────────► derived = Cancelled
//! ```
//!
//! [`transform_async`] differs only in that `f` yields another future, and the
//! derived future adopts that future's outcome once it resolves.

use super::{adopt, cancel_upstream, completed_outcome, run_step, split};
use crate::error::Failure;
use crate::executor::Executor;
use crate::future::FluentFuture;
use crate::outcome::catch;
use crate::promise::Promise;

/// Derives a future holding `f(value)` once `source` succeeds.
///
/// `f` runs on `executor`. An `Err` returned by `f`, or a panic inside it,
/// fails the derived future.
pub fn transform<T, U, E, F>(source: &FluentFuture<T>, executor: &Executor, f: F) -> FluentFuture<U>
where
    T: Clone + Send + 'static,
    U: Clone + Send + 'static,
    E: Into<Failure>,
    F: FnOnce(T) -> Result<U, E> + Send + 'static,
{
    let promise = Promise::new();
    let derived = promise.future();
    let target = promise.clone();
    let reader = source.clone();
    let executor = executor.clone();
    source.add_listener(
        move || match split(completed_outcome(&reader)) {
            Ok(value) => run_step(&executor, &target, move |p| {
                p.complete(catch(move || f(value)));
            }),
            Err(passed) => {
                target.complete(passed);
            }
        },
        &Executor::INLINE,
    );
    cancel_upstream(&promise, source);
    derived
}

/// Derives a future that adopts the outcome of the future `f(value)` returns.
///
/// If `f` fails before producing a future, the derived future fails at once.
pub fn transform_async<T, U, E, F>(
    source: &FluentFuture<T>,
    executor: &Executor,
    f: F,
) -> FluentFuture<U>
where
    T: Clone + Send + 'static,
    U: Clone + Send + 'static,
    E: Into<Failure>,
    F: FnOnce(T) -> Result<FluentFuture<U>, E> + Send + 'static,
{
    let promise = Promise::new();
    let derived = promise.future();
    let target = promise.clone();
    let reader = source.clone();
    let executor = executor.clone();
    source.add_listener(
        move || match split(completed_outcome(&reader)) {
            Ok(value) => run_step(&executor, &target, move |p| {
                match split(catch(move || f(value))) {
                    Ok(inner) => adopt(p, &inner),
                    Err(failed) => {
                        p.complete(failed);
                    }
                }
            }),
            Err(passed) => {
                target.complete(passed);
            }
        },
        &Executor::INLINE,
    );
    cancel_upstream(&promise, source);
    derived
}
