//! Aggregator: many futures into one future of an ordered `Vec`.
//!
//! The aggregate succeeds once every input has succeeded, with the i-th value
//! in the i-th slot no matter which input finished first. The first input
//! observed to fail or be cancelled decides the aggregate's outcome right
//! away; the remaining inputs are not waited for. Cancelling the aggregate
//! cancels every input.

use super::{cancel_upstream, completed_outcome, run_step};
use crate::executor::Executor;
use crate::future::FluentFuture;
use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::tracing_compat::trace;
use parking_lot::Mutex;
use std::sync::Arc;

struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> Gather<T> {
    fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
            remaining: len,
        }
    }

    /// Records the value of input `index`; returns every value once all are in.
    fn fill(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        let slot = self.slots.get_mut(index)?;
        if slot.replace(value).is_none() {
            self.remaining -= 1;
        }
        if self.remaining > 0 {
            return None;
        }
        Some(std::mem::take(&mut self.slots).into_iter().flatten().collect())
    }
}

/// Combines `futures` into a future of their values, in input order.
///
/// Bookkeeping runs inline on whichever thread completes each input. An empty
/// input succeeds immediately with an empty `Vec`.
pub fn combine<T, I>(futures: I) -> FluentFuture<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = FluentFuture<T>>,
{
    combine_on(futures, &Executor::INLINE)
}

/// [`combine`] with the per-input bookkeeping handed to `executor`.
pub fn combine_on<T, I>(futures: I, executor: &Executor) -> FluentFuture<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = FluentFuture<T>>,
{
    let inputs: Vec<FluentFuture<T>> = futures.into_iter().collect();
    let promise = Promise::new();
    let aggregate = promise.future();
    if inputs.is_empty() {
        promise.set(Vec::new());
        return aggregate;
    }

    let total = inputs.len();
    let gather = Arc::new(Mutex::new(Gather::new(total)));
    for (index, input) in inputs.iter().enumerate() {
        let target = promise.clone();
        let gather = Arc::clone(&gather);
        let reader = input.clone();
        let executor = executor.clone();
        input.add_listener(
            move || {
                run_step(&executor, &target, move |p| match completed_outcome(&reader) {
                    Outcome::Ok(value) => {
                        let values = gather.lock().fill(index, value);
                        if let Some(values) = values {
                            trace!(inputs = total, "all combined futures succeeded");
                            p.set(values);
                        }
                    }
                    Outcome::Err(failure) => {
                        trace!(index, "combined future failed");
                        p.set_failure(failure);
                    }
                    Outcome::Cancelled => {
                        trace!(index, "combined future cancelled");
                        p.cancel();
                    }
                });
            },
            &Executor::INLINE,
        );
    }
    for input in &inputs {
        cancel_upstream(&promise, input);
    }
    aggregate
}
