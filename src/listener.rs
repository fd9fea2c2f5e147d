//! Listener registry: callbacks waiting for a future to complete.
//!
//! The registry is a list of `(job, executor)` entries that flips exactly once
//! from `Open` to `Drained`. It has no lock of its own: the owning
//! [`CompletionCell`](crate::cell::CompletionCell) keeps it behind the same
//! mutex as the future's state, so "push while pending" and "drain on
//! completion" can never interleave.
//!
//! ```text
//!   add_listener ──► Open([a, b]) ──push──► Open([a, b, c])
//!                                                │ complete()
//!                                                ▼
//!                        Drained ◄──── take [a, b, c] and dispatch in order
//!   add_listener ──► Drained ──► dispatch immediately
//! ```
//!
//! Dispatch is fire-and-forget. A listener that panics is logged at `warn`
//! and the remaining listeners still run. A listener whose executor rejects
//! it is logged at `error` and dropped.
//!
//! # Nested dispatch
//!
//! An inline listener that completes another future dispatches that future's
//! listeners from inside its own call, so a chain of derived futures nests one
//! dispatch per link. Nesting is bounded per thread: past
//! `MAX_NESTED_DISPATCH` levels, entries are parked in a thread-local queue
//! and run by the outermost dispatch once its own entries are done. They still
//! run on the completing thread, and entries of one future keep their order.

use crate::error::PanicPayload;
use crate::executor::{Executor, Job};
use crate::tracing_compat::{error, trace, warn};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Dispatch levels allowed on one thread before entries are deferred.
const MAX_NESTED_DISPATCH: usize = 32;

struct Trampoline {
    depth: usize,
    deferred: VecDeque<ListenerEntry>,
}

thread_local! {
    static TRAMPOLINE: RefCell<Trampoline> = const {
        RefCell::new(Trampoline {
            depth: 0,
            deferred: VecDeque::new(),
        })
    };
}

/// Leaves one dispatch level on drop, including during unwinding.
struct DepthGuard;

impl Drop for DepthGuard {
    fn drop(&mut self) {
        TRAMPOLINE.with(|t| {
            let mut t = t.borrow_mut();
            t.depth = t.depth.saturating_sub(1);
        });
    }
}

/// A callback paired with the context it must run on.
pub(crate) struct ListenerEntry {
    job: Job,
    executor: Executor,
}

impl ListenerEntry {
    pub(crate) fn new(job: Job, executor: Executor) -> Self {
        Self { job, executor }
    }

    /// Hands the callback to its executor.
    #[cfg_attr(not(feature = "tracing-integration"), allow(unused_variables))]
    pub(crate) fn dispatch(self) {
        let Self { job, executor } = self;
        if let Err(rejected) = executor.execute(isolate(job)) {
            error!(
                error = %rejected,
                executor = ?executor,
                "executor rejected listener; callback dropped"
            );
        }
    }
}

/// Wraps a job so a panic inside it is logged instead of unwinding further.
#[cfg_attr(not(feature = "tracing-integration"), allow(unused_variables))]
fn isolate(job: Job) -> Job {
    Box::new(move || {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
            let payload = PanicPayload::from_unwind(payload.as_ref());
            warn!(panic = %payload, "listener panicked; continuing dispatch");
        }
    })
}

/// Pending listeners of one future.
pub(crate) enum ListenerRegistry {
    /// The future is pending; entries wait in registration order.
    Open(Vec<ListenerEntry>),
    /// The future completed and the entries were handed out.
    Drained,
}

impl ListenerRegistry {
    pub(crate) const fn new() -> Self {
        Self::Open(Vec::new())
    }

    /// Appends an entry, or hands it back if the registry was already drained.
    pub(crate) fn push(&mut self, entry: ListenerEntry) -> Result<(), ListenerEntry> {
        match self {
            Self::Open(entries) => {
                entries.push(entry);
                Ok(())
            }
            Self::Drained => Err(entry),
        }
    }

    /// Swaps the entries for the drained marker.
    ///
    /// A second call returns nothing, so no entry is handed out twice.
    pub(crate) fn drain(&mut self) -> Vec<ListenerEntry> {
        match std::mem::replace(self, Self::Drained) {
            Self::Open(entries) => entries,
            Self::Drained => Vec::new(),
        }
    }

    /// Number of entries still waiting.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Open(entries) => entries.len(),
            Self::Drained => 0,
        }
    }

    #[cfg(test)]
    pub(crate) const fn is_drained(&self) -> bool {
        matches!(self, Self::Drained)
    }
}

/// Dispatches drained entries in registration order.
///
/// Too deep a nesting on this thread parks the entries for the outermost
/// dispatch instead of running them here.
pub(crate) fn dispatch_all(entries: Vec<ListenerEntry>) {
    if entries.is_empty() {
        return;
    }
    let admitted = TRAMPOLINE.with(|t| {
        let mut t = t.borrow_mut();
        if t.depth >= MAX_NESTED_DISPATCH {
            trace!(listeners = entries.len(), "dispatch nested too deep; deferring");
            t.deferred.extend(entries);
            return None;
        }
        t.depth += 1;
        Some((t.depth == 1, entries))
    });
    let Some((outermost, entries)) = admitted else {
        return;
    };
    let _level = DepthGuard;
    trace!(listeners = entries.len(), "dispatching listeners");
    for entry in entries {
        entry.dispatch();
    }
    if outermost {
        while let Some(entry) = TRAMPOLINE.with(|t| t.borrow_mut().deferred.pop_front()) {
            entry.dispatch();
        }
    }
}
