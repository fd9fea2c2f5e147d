//! Checked conversion: blocking accessors with a caller-chosen error type.

use crate::error::{Error, Result};
use crate::executor::{Executor, Job};
use crate::future::{FluentFuture, ListenableFuture};
use crate::outcome::Outcome;
use core::fmt;
use std::sync::Arc;
use std::time::Duration;

type Mapper<X> = Arc<dyn Fn(Error) -> X + Send + Sync>;

/// A future whose checked accessors report errors as `X`.
///
/// The mapper sees every [`Error`] a blocking accessor would have returned,
/// including timeouts and cancellation, and runs on the calling thread. The
/// future's own state and listeners are those of the wrapped future.
pub struct CheckedFuture<T, X> {
    future: FluentFuture<T>,
    map: Mapper<X>,
}

impl<T, X> Clone for CheckedFuture<T, X> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
            map: Arc::clone(&self.map),
        }
    }
}

impl<T, X> fmt::Debug for CheckedFuture<T, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckedFuture")
            .field("future", &self.future)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static, X> CheckedFuture<T, X> {
    pub(crate) fn new<M>(future: FluentFuture<T>, map: M) -> Self
    where
        M: Fn(Error) -> X + Send + Sync + 'static,
    {
        Self {
            future,
            map: Arc::new(map),
        }
    }

    /// Blocks until terminal, mapping any error through the mapper.
    pub fn checked_get(&self) -> core::result::Result<T, X> {
        self.future.get().map_err(|err| (self.map)(err))
    }

    /// Blocks until terminal or `timeout`, mapping any error.
    pub fn checked_get_timeout(&self, timeout: Duration) -> core::result::Result<T, X> {
        self.future.get_timeout(timeout).map_err(|err| (self.map)(err))
    }

    /// Returns the unchecked view of the same future.
    #[must_use]
    pub fn future(&self) -> &FluentFuture<T> {
        &self.future
    }
}

impl<T, X> ListenableFuture<T> for CheckedFuture<T, X>
where
    T: Clone + Send + 'static,
    X: 'static,
{
    fn add_listener(&self, listener: Job, executor: &Executor) {
        self.future.add_listener(listener, executor);
    }

    fn is_done(&self) -> bool {
        self.future.is_done()
    }

    fn is_cancelled(&self) -> bool {
        self.future.is_cancelled()
    }

    fn cancel(&self) -> bool {
        self.future.cancel()
    }

    fn get_timeout(&self, timeout: Duration) -> Result<T> {
        self.future.get_timeout(timeout)
    }

    fn get(&self) -> Result<T> {
        self.future.get()
    }

    fn try_outcome(&self) -> Option<Outcome<T>> {
        self.future.try_outcome()
    }
}
