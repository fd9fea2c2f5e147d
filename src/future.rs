//! The future capability set and the fluent decorator.
//!
//! [`ListenableFuture`] is everything a future source has to provide:
//! listener registration, state queries, cancellation and a timed blocking
//! read. [`FluentFuture`] wraps *any* implementation of it and adds the
//! combinator API on top, so a third-party source composes exactly like the
//! crate's own [`Promise`](crate::promise::Promise) and
//! [`FutureTask`](crate::task::FutureTask).
//!
//! # Example
//!
//! ```
//! use fluent_future::FutureTask;
//!
//! let task = FutureTask::new(|| Ok::<_, std::fmt::Error>(20));
//! let doubled = task.future().transform(|v| v * 2);
//! task.run();
//! assert_eq!(doubled.get().unwrap(), 40);
//! ```

use crate::combinator::{self, CheckedFuture, FutureCallback, OnFailure, OnSuccess};
use crate::error::{Error, ErrorKind, Failure, Result};
use crate::executor::{Executor, Job};
use crate::outcome::Outcome;
use crate::wait::Wait;
use core::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Capability set every future source must provide.
///
/// Combinators are written only against this trait.
pub trait ListenableFuture<T>: Send + Sync {
    /// Runs `listener` on `executor` once this future is terminal.
    ///
    /// Must run every listener exactly once, including listeners registered
    /// after completion.
    fn add_listener(&self, listener: Job, executor: &Executor);

    /// Returns true once the future is terminal.
    fn is_done(&self) -> bool;

    /// Returns true if the future was cancelled.
    fn is_cancelled(&self) -> bool;

    /// Attempts to cancel the future. Returns true if this call cancelled it.
    fn cancel(&self) -> bool;

    /// Blocks until the future is terminal or `timeout` elapses.
    ///
    /// Implementations must treat a timeout too large to represent as a
    /// deadline (such as [`Duration::MAX`]) as unbounded.
    fn get_timeout(&self, timeout: Duration) -> Result<T>;

    /// Blocks until the future is terminal.
    fn get(&self) -> Result<T> {
        self.get_timeout(Duration::MAX)
    }

    /// Returns the outcome without blocking, or `None` while pending.
    fn try_outcome(&self) -> Option<Outcome<T>> {
        if !self.is_done() {
            return None;
        }
        match self.get_timeout(Duration::ZERO) {
            Ok(value) => Some(Outcome::Ok(value)),
            Err(err) => outcome_from_error(err),
        }
    }
}

/// Recovers a terminal outcome from a blocking accessor's error.
fn outcome_from_error<T>(err: Error) -> Option<Outcome<T>> {
    match err.kind() {
        ErrorKind::Cancelled => Some(Outcome::Cancelled),
        ErrorKind::Timeout => None,
        ErrorKind::Execution => {
            let failure = err.cause().cloned().unwrap_or_else(|| Failure::new(err));
            Some(Outcome::Err(failure))
        }
    }
}

/// A future with the fluent combinator API.
///
/// Cloning is cheap and every clone observes the same underlying source.
pub struct FluentFuture<T> {
    source: Arc<dyn ListenableFuture<T>>,
}

impl<T> Clone for FluentFuture<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for FluentFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if !self.source.is_done() {
            "pending"
        } else if self.source.is_cancelled() {
            "cancelled"
        } else {
            "done"
        };
        f.debug_struct("FluentFuture").field("state", &state).finish()
    }
}

impl<T: Clone + Send + 'static> FluentFuture<T> {
    /// Decorates any future source.
    #[must_use]
    pub fn new(source: impl ListenableFuture<T> + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Decorates an already shared future source.
    #[must_use]
    pub fn from_shared(source: Arc<dyn ListenableFuture<T>>) -> Self {
        Self { source }
    }

    pub(crate) fn downgrade(&self) -> Weak<dyn ListenableFuture<T>> {
        Arc::downgrade(&self.source)
    }

    /// Registers a raw listener. See [`ListenableFuture::add_listener`].
    pub fn add_listener<F>(&self, listener: F, executor: &Executor)
    where
        F: FnOnce() + Send + 'static,
    {
        self.source.add_listener(Box::new(listener), executor);
    }

    /// Returns true once the future is terminal.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.source.is_done()
    }

    /// Returns true if the future was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }

    /// Attempts to cancel the future.
    ///
    /// Returns false if the future was already terminal. Cancelling a derived
    /// future also requests cancellation of the futures it depends on.
    pub fn cancel(&self) -> bool {
        self.source.cancel()
    }

    /// Returns the outcome without blocking, or `None` while pending.
    #[must_use]
    pub fn try_outcome(&self) -> Option<Outcome<T>> {
        self.source.try_outcome()
    }

    /// Blocks until the future is terminal.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Execution`] wrapping the failure if the future failed
    /// - [`ErrorKind::Cancelled`] if it was cancelled
    pub fn get(&self) -> Result<T> {
        self.source.get()
    }

    /// Blocks until the future is terminal or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`ErrorKind::Timeout`] if the deadline
    /// passes first. The future stays pending after a timeout.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T> {
        self.source.get_timeout(timeout)
    }

    /// Blocks until terminal and converts any error into the caller's type.
    pub fn get_checked<X: From<Error>>(&self) -> core::result::Result<T, X> {
        self.get().map_err(X::from)
    }

    /// Timed variant of [`get_checked`](Self::get_checked).
    pub fn get_checked_timeout<X: From<Error>>(
        &self,
        timeout: Duration,
    ) -> core::result::Result<T, X> {
        self.get_timeout(timeout).map_err(X::from)
    }

    /// Applies `f` to the value, inline on the completing thread.
    ///
    /// Failure and cancellation pass through without calling `f`. A panic in
    /// `f` fails the derived future.
    #[must_use]
    pub fn transform<U, F>(&self, f: F) -> FluentFuture<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.transform_on(&Executor::INLINE, f)
    }

    /// Applies `f` to the value on `executor`.
    #[must_use]
    pub fn transform_on<U, F>(&self, executor: &Executor, f: F) -> FluentFuture<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        combinator::transform(self, executor, move |v| Ok::<_, Failure>(f(v)))
    }

    /// Applies a fallible `f`; an `Err` fails the derived future.
    #[must_use]
    pub fn try_transform<U, E, F>(&self, f: F) -> FluentFuture<U>
    where
        U: Clone + Send + 'static,
        E: Into<Failure>,
        F: FnOnce(T) -> core::result::Result<U, E> + Send + 'static,
    {
        combinator::transform(self, &Executor::INLINE, f)
    }

    /// Applies a fallible `f` on `executor`.
    #[must_use]
    pub fn try_transform_on<U, E, F>(&self, executor: &Executor, f: F) -> FluentFuture<U>
    where
        U: Clone + Send + 'static,
        E: Into<Failure>,
        F: FnOnce(T) -> core::result::Result<U, E> + Send + 'static,
    {
        combinator::transform(self, executor, f)
    }

    /// Chains an asynchronous step: the derived future adopts the outcome of
    /// the future returned by `f`.
    #[must_use]
    pub fn transform_async<U, E, F>(&self, f: F) -> FluentFuture<U>
    where
        U: Clone + Send + 'static,
        E: Into<Failure>,
        F: FnOnce(T) -> core::result::Result<FluentFuture<U>, E> + Send + 'static,
    {
        combinator::transform_async(self, &Executor::INLINE, f)
    }

    /// Asynchronous step whose function runs on `executor`.
    #[must_use]
    pub fn transform_async_on<U, E, F>(&self, executor: &Executor, f: F) -> FluentFuture<U>
    where
        U: Clone + Send + 'static,
        E: Into<Failure>,
        F: FnOnce(T) -> core::result::Result<FluentFuture<U>, E> + Send + 'static,
    {
        combinator::transform_async(self, executor, f)
    }

    /// Replaces a failure with the value produced by `fallback`.
    ///
    /// Success and cancellation pass through without calling `fallback`.
    #[must_use]
    pub fn with_fallback<E, F>(&self, fallback: F) -> FluentFuture<T>
    where
        E: Into<Failure>,
        F: FnOnce(Failure) -> core::result::Result<T, E> + Send + 'static,
    {
        combinator::with_fallback(self, &Executor::INLINE, fallback)
    }

    /// Fallback that runs on `executor`.
    #[must_use]
    pub fn with_fallback_on<E, F>(&self, executor: &Executor, fallback: F) -> FluentFuture<T>
    where
        E: Into<Failure>,
        F: FnOnce(Failure) -> core::result::Result<T, E> + Send + 'static,
    {
        combinator::with_fallback(self, executor, fallback)
    }

    /// Replaces a failure with the outcome of the future `fallback` returns.
    #[must_use]
    pub fn with_fallback_async<E, F>(&self, fallback: F) -> FluentFuture<T>
    where
        E: Into<Failure>,
        F: FnOnce(Failure) -> core::result::Result<FluentFuture<T>, E> + Send + 'static,
    {
        combinator::with_fallback_async(self, &Executor::INLINE, fallback)
    }

    /// Asynchronous fallback that runs on `executor`.
    #[must_use]
    pub fn with_fallback_async_on<E, F>(&self, executor: &Executor, fallback: F) -> FluentFuture<T>
    where
        E: Into<Failure>,
        F: FnOnce(Failure) -> core::result::Result<FluentFuture<T>, E> + Send + 'static,
    {
        combinator::with_fallback_async(self, executor, fallback)
    }

    /// Registers `callback`, run inline on the completing thread.
    pub fn add_callback<C: FutureCallback<T>>(&self, callback: C) -> &Self {
        self.add_callback_on(&Executor::INLINE, callback)
    }

    /// Registers `callback` to run on `executor`.
    pub fn add_callback_on<C: FutureCallback<T>>(&self, executor: &Executor, callback: C) -> &Self {
        combinator::add_callback(self, executor, callback);
        self
    }

    /// Runs `f` with the value if the future succeeds.
    pub fn on_success<F>(&self, f: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.add_callback(OnSuccess::new(f))
    }

    /// Runs `f` on `executor` with the value if the future succeeds.
    pub fn on_success_on<F>(&self, executor: &Executor, f: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.add_callback_on(executor, OnSuccess::new(f))
    }

    /// Runs `f` with the failure if the future fails or is cancelled.
    pub fn on_failure<F>(&self, f: F) -> &Self
    where
        F: FnOnce(Failure) + Send + 'static,
    {
        self.add_callback(OnFailure::new(f))
    }

    /// Runs `f` on `executor` if the future fails or is cancelled.
    pub fn on_failure_on<F>(&self, executor: &Executor, f: F) -> &Self
    where
        F: FnOnce(Failure) + Send + 'static,
    {
        self.add_callback_on(executor, OnFailure::new(f))
    }

    /// Wraps this future so its blocking accessors return `X`, built by `map`.
    #[must_use]
    pub fn make_checked<X, M>(&self, map: M) -> CheckedFuture<T, X>
    where
        M: Fn(Error) -> X + Send + Sync + 'static,
    {
        CheckedFuture::new(self.clone(), map)
    }

    /// Returns a `std::future::Future` resolving with this future's result.
    #[must_use]
    pub fn wait(&self) -> Wait<T> {
        Wait::new(self.clone())
    }
}
