//! Future task: a computation bound to a completion cell.
//!
//! A [`FutureTask`] is created pending. Calling [`run`](FutureTask::run) (on
//! any thread, typically by handing [`FutureTask::into_job`] to an executor)
//! evaluates the computation once and completes the cell with its outcome.
//!
//! # Cancellation
//!
//! [`cancel`](FutureTask::cancel) completes the cell with `CANCELLED` if it is
//! still pending. A task that has not started yet will never run its body. A
//! task already running cannot be stopped preemptively; instead the
//! [`CancelToken`] passed to [`interruptible`](FutureTask::interruptible)
//! bodies flips, and whatever the body returns afterwards is discarded.

use crate::cell::CompletionCell;
use crate::error::{Failure, Result};
use crate::executor::{Executor, Job};
use crate::future::{FluentFuture, ListenableFuture};
use crate::outcome::{catch, Outcome};
use crate::tracing_compat::{debug, trace};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative interruption flag handed to interruptible computations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the owning task was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

type Body<T> = Box<dyn FnOnce(&CancelToken) -> Outcome<T> + Send>;

struct TaskInner<T> {
    cell: CompletionCell<T>,
    body: Mutex<Option<Body<T>>>,
    token: CancelToken,
}

impl<T> TaskInner<T> {
    fn run(&self) {
        let Some(body) = self.body.lock().take() else {
            trace!("task already ran");
            return;
        };
        if self.cell.is_done() {
            debug!("task cancelled before it started");
            return;
        }
        debug!("task running");
        let outcome = body(&self.token);
        if !self.cell.complete(outcome) {
            trace!("task result discarded; future already terminal");
        }
    }
}

impl<T: Clone + Send + 'static> ListenableFuture<T> for TaskInner<T> {
    fn add_listener(&self, listener: Job, executor: &Executor) {
        self.cell.add_listener(listener, executor);
    }

    fn is_done(&self) -> bool {
        self.cell.is_done()
    }

    fn is_cancelled(&self) -> bool {
        self.cell.is_cancelled()
    }

    fn cancel(&self) -> bool {
        if !self.cell.complete(Outcome::Cancelled) {
            return false;
        }
        self.token.trigger();
        // Drop a body that never started so its captures are released.
        drop(self.body.lock().take());
        debug!("task cancelled");
        true
    }

    fn get_timeout(&self, timeout: Duration) -> Result<T> {
        self.cell.get_timeout(timeout)
    }

    fn get(&self) -> Result<T> {
        ListenableFuture::get(&self.cell)
    }

    fn try_outcome(&self) -> Option<Outcome<T>> {
        self.cell.peek()
    }
}

/// A runnable computation whose result is observed through a future.
pub struct FutureTask<T> {
    inner: Arc<TaskInner<T>>,
}

impl<T> Clone for FutureTask<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for FutureTask<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FutureTask")
            .field("cell", &self.inner.cell)
            .field("started", &self.inner.body.lock().is_none())
            .finish()
    }
}

impl<T: Clone + Send + 'static> FutureTask<T> {
    fn from_body(body: Body<T>) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                cell: CompletionCell::new(),
                body: Mutex::new(Some(body)),
                token: CancelToken::new(),
            }),
        }
    }

    /// Binds a fallible computation.
    ///
    /// `Err` and panics both become the future's failure.
    #[must_use]
    pub fn new<E, F>(computation: F) -> Self
    where
        E: Into<Failure>,
        F: FnOnce() -> core::result::Result<T, E> + Send + 'static,
    {
        Self::from_body(Box::new(move |_| catch(computation)))
    }

    /// Binds a computation that can observe cancellation through a token.
    #[must_use]
    pub fn interruptible<E, F>(computation: F) -> Self
    where
        E: Into<Failure>,
        F: FnOnce(&CancelToken) -> core::result::Result<T, E> + Send + 'static,
    {
        Self::from_body(Box::new(move |token| catch(|| computation(token))))
    }

    /// Binds a plain action; the future succeeds with `result` once it ran.
    #[must_use]
    pub fn with_result<F>(action: F, result: T) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(move || {
            action();
            Ok::<_, Failure>(result)
        })
    }

    /// Evaluates the computation if it has not run yet.
    ///
    /// Later calls, and calls after cancellation, do nothing.
    pub fn run(&self) {
        self.inner.run();
    }

    /// Packages [`run`](Self::run) as a job for an executor.
    #[must_use]
    pub fn into_job(self) -> Job {
        Box::new(move || self.run())
    }

    /// Cancels the task if still pending and signals its [`CancelToken`].
    pub fn cancel(&self) -> bool {
        self.inner.cancel()
    }

    /// Returns true once the task's future is terminal.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    /// Returns true if the task was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Blocks until terminal. See [`FluentFuture::get`].
    pub fn get(&self) -> Result<T> {
        ListenableFuture::get(self.inner.as_ref())
    }

    /// Blocks until terminal or `timeout` elapses.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T> {
        self.inner.get_timeout(timeout)
    }

    /// Returns the fluent view of this task's result.
    #[must_use]
    pub fn future(&self) -> FluentFuture<T> {
        FluentFuture::from_shared(Arc::clone(&self.inner) as Arc<dyn ListenableFuture<T>>)
    }

    /// Fails a task that could not be handed to an executor.
    pub(crate) fn fail(&self, failure: Failure) -> bool {
        drop(self.inner.body.lock().take());
        self.inner.cell.complete(Outcome::Err(failure))
    }
}
