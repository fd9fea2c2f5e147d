//! Completion cell: single-assignment state holder for a future's outcome.
//!
//! # State machine
//!
//! ```text
//!             complete(Ok v)      ┌──────────────┐
//!          ┌─────────────────────►│ SUCCEEDED(v) │
//!          │                      └──────────────┘
//!   ┌──────┴──┐  complete(Err f)  ┌──────────────┐
//!   │ PENDING ├──────────────────►│  FAILED(f)   │
//!   └──────┬──┘                   └──────────────┘
//!          │   complete(Cancelled)┌──────────────┐
//!          └─────────────────────►│  CANCELLED   │
//!                                 └──────────────┘
//! ```
//!
//! Transitions are one-shot: the first `complete` wins, later ones return
//! `false` and change nothing.
//!
//! # Synchronization
//!
//! The outcome and the [`ListenerRegistry`] share one mutex. `complete` sets
//! the outcome and drains the registry in the same critical section, then
//! releases the lock before dispatching. `add_listener` either pushes while
//! the state is pending or, once drained, dispatches on the spot. Every
//! listener therefore runs exactly once, after the outcome is visible.

use crate::executor::{Executor, Job};
use crate::listener::{dispatch_all, ListenerEntry, ListenerRegistry};
use crate::outcome::Outcome;
use crate::tracing_compat::trace;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

struct Inner<T> {
    outcome: Option<Outcome<T>>,
    listeners: ListenerRegistry,
}

/// Single-assignment outcome holder with a listener registry.
pub struct CompletionCell<T> {
    inner: Mutex<Inner<T>>,
    completed: Condvar,
}

impl<T> CompletionCell<T> {
    /// Creates a pending cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                outcome: None,
                listeners: ListenerRegistry::new(),
            }),
            completed: Condvar::new(),
        }
    }

    /// Moves the cell to a terminal state.
    ///
    /// Returns `true` if this call won the transition. The winner wakes all
    /// blocked readers and dispatches every registered listener in order.
    pub fn complete(&self, outcome: Outcome<T>) -> bool {
        let entries = {
            let mut inner = self.inner.lock();
            if inner.outcome.is_some() {
                return false;
            }
            trace!(
                state = state_name(&outcome),
                listeners = inner.listeners.len(),
                "future completed"
            );
            inner.outcome = Some(outcome);
            inner.listeners.drain()
        };
        self.completed.notify_all();
        dispatch_all(entries);
        true
    }

    /// Registers `job` to run on `executor` once the cell is terminal.
    ///
    /// If the cell is already terminal the job is dispatched before this
    /// call returns (the executor decides when it actually runs). Inside a
    /// deeply nested inline dispatch it is deferred to the outermost one on
    /// this thread instead.
    pub fn add_listener(&self, job: Job, executor: &Executor) {
        let entry = ListenerEntry::new(job, executor.clone());
        let late = self.inner.lock().listeners.push(entry).err();
        if let Some(entry) = late {
            dispatch_all(vec![entry]);
        }
    }

    /// Returns true once the cell holds an outcome.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.inner.lock().outcome.is_some()
    }

    /// Returns true if the cell was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.inner.lock().outcome, Some(Outcome::Cancelled))
    }

    /// Number of listeners still waiting for completion.
    #[must_use]
    pub fn pending_listeners(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

impl<T: Clone> CompletionCell<T> {
    /// Returns a copy of the outcome without blocking.
    #[must_use]
    pub fn peek(&self) -> Option<Outcome<T>> {
        self.inner.lock().outcome.clone()
    }

    /// Blocks until the cell is terminal.
    pub fn wait(&self) -> Outcome<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(outcome) = &inner.outcome {
                return outcome.clone();
            }
            self.completed.wait(&mut inner);
        }
    }

    /// Blocks until the cell is terminal or `timeout` elapses.
    ///
    /// Returns `None` on timeout; the cell is left untouched. A timeout too
    /// large to represent as a deadline waits without bound.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome<T>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait());
        };
        let mut inner = self.inner.lock();
        loop {
            if let Some(outcome) = &inner.outcome {
                return Some(outcome.clone());
            }
            if self.completed.wait_until(&mut inner, deadline).timed_out() {
                return inner.outcome.clone();
            }
        }
    }
}

impl<T> Default for CompletionCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for CompletionCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        let state = inner.outcome.as_ref().map_or("pending", state_name);
        f.debug_struct("CompletionCell")
            .field("state", &state)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

fn state_name<T>(outcome: &Outcome<T>) -> &'static str {
    match outcome {
        Outcome::Ok(_) => "succeeded",
        Outcome::Err(_) => "failed",
        Outcome::Cancelled => "cancelled",
    }
}
