//! Settable future: the write side of a completion cell.
//!
//! A [`Promise`] is how combinators and aggregators own the futures they
//! derive. Whoever holds the promise may complete it; everyone else only sees
//! the read-only [`FluentFuture`] returned by [`Promise::future`].

use crate::cell::CompletionCell;
use crate::error::{Error, Failure, Result};
use crate::executor::{Executor, Job};
use crate::future::{FluentFuture, ListenableFuture};
use crate::outcome::Outcome;
use crate::tracing_compat::debug;
use std::sync::Arc;
use std::time::Duration;

/// The write handle of a single-assignment future.
pub struct Promise<T> {
    cell: Arc<CompletionCell<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> std::fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Promise").field("cell", &self.cell).finish()
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Creates a pending promise.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: Arc::new(CompletionCell::new()),
        }
    }

    /// Returns the read side.
    #[must_use]
    pub fn future(&self) -> FluentFuture<T> {
        FluentFuture::from_shared(Arc::clone(&self.cell) as Arc<dyn ListenableFuture<T>>)
    }

    /// Completes with a value. Returns false if already terminal.
    pub fn set(&self, value: T) -> bool {
        self.cell.complete(Outcome::Ok(value))
    }

    /// Completes with a failure. Returns false if already terminal.
    pub fn set_failure(&self, failure: impl Into<Failure>) -> bool {
        self.cell.complete(Outcome::Err(failure.into()))
    }

    /// Completes with an arbitrary outcome. Returns false if already terminal.
    pub fn complete(&self, outcome: Outcome<T>) -> bool {
        self.cell.complete(outcome)
    }

    /// Cancels the promise. Returns false if already terminal.
    pub fn cancel(&self) -> bool {
        self.cell.cancel()
    }

    /// Returns true once the promise is terminal.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cell.is_done()
    }
}

impl<T: Clone + Send + 'static> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> ListenableFuture<T> for CompletionCell<T> {
    fn add_listener(&self, listener: Job, executor: &Executor) {
        Self::add_listener(self, listener, executor);
    }

    fn is_done(&self) -> bool {
        Self::is_done(self)
    }

    fn is_cancelled(&self) -> bool {
        Self::is_cancelled(self)
    }

    fn cancel(&self) -> bool {
        let cancelled = self.complete(Outcome::Cancelled);
        if cancelled {
            debug!("future cancelled");
        }
        cancelled
    }

    fn get_timeout(&self, timeout: Duration) -> Result<T> {
        self.wait_timeout(timeout)
            .map_or_else(|| Err(Error::timeout(timeout)), Outcome::into_result)
    }

    fn get(&self) -> Result<T> {
        self.wait().into_result()
    }

    fn try_outcome(&self) -> Option<Outcome<T>> {
        self.peek()
    }
}
