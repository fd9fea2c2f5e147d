//! Callback sugar: side effects on completion, no derived future.
//!
//! A [`FutureCallback`] has a success branch and a failure branch. A cancelled
//! future takes the failure branch with a `Failure` wrapping a cancelled
//! [`Error`], so a callback can tell the two apart with
//! [`Failure::downcast_ref`].

use super::completed_outcome;
use crate::error::{Error, Failure};
use crate::executor::Executor;
use crate::future::FluentFuture;
use crate::outcome::Outcome;

/// Receives the outcome of a future.
pub trait FutureCallback<T>: Send + 'static {
    /// Called with the value when the future succeeds.
    fn on_success(self, value: T);

    /// Called when the future fails or is cancelled.
    fn on_failure(self, failure: Failure);
}

/// Callback that only reacts to success.
#[derive(Debug)]
pub struct OnSuccess<F> {
    f: F,
}

impl<F> OnSuccess<F> {
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> FutureCallback<T> for OnSuccess<F>
where
    F: FnOnce(T) + Send + 'static,
{
    fn on_success(self, value: T) {
        (self.f)(value);
    }

    fn on_failure(self, _failure: Failure) {}
}

/// Callback that only reacts to failure or cancellation.
#[derive(Debug)]
pub struct OnFailure<F> {
    f: F,
}

impl<F> OnFailure<F> {
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> FutureCallback<T> for OnFailure<F>
where
    F: FnOnce(Failure) + Send + 'static,
{
    fn on_success(self, _value: T) {}

    fn on_failure(self, failure: Failure) {
        (self.f)(failure);
    }
}

/// Registers `callback` to run on `executor` once `source` is terminal.
pub fn add_callback<T, C>(source: &FluentFuture<T>, executor: &Executor, callback: C)
where
    T: Clone + Send + 'static,
    C: FutureCallback<T>,
{
    let reader = source.clone();
    source.add_listener(
        move || match completed_outcome(&reader) {
            Outcome::Ok(value) => callback.on_success(value),
            Outcome::Err(failure) => callback.on_failure(failure),
            Outcome::Cancelled => callback.on_failure(Failure::new(Error::cancelled())),
        },
        executor,
    );
}
