//! Bridge from listener-based futures to `std::future::Future`.
//!
//! [`Wait`] registers one inline listener the first time it is polled. The
//! listener wakes whichever waker was stored last, so moving the `Wait`
//! between tasks keeps working.

use crate::error::Result;
use crate::executor::Executor;
use crate::future::FluentFuture;
use crate::outcome::Outcome;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// Future returned by [`FluentFuture::wait`].
#[must_use = "futures do nothing unless polled"]
pub struct Wait<T> {
    future: FluentFuture<T>,
    waker: Option<Arc<Mutex<Option<Waker>>>>,
}

impl<T> std::fmt::Debug for Wait<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wait")
            .field("future", &self.future)
            .field("registered", &self.waker.is_some())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Wait<T> {
    pub(crate) fn new(future: FluentFuture<T>) -> Self {
        Self {
            future,
            waker: None,
        }
    }

    fn ready(&self) -> Option<Result<T>> {
        self.future.try_outcome().map(Outcome::into_result)
    }
}

impl<T: Clone + Send + 'static> Future for Wait<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(result) = self.ready() {
            return Poll::Ready(result);
        }
        if let Some(slot) = &self.waker {
            let mut current = slot.lock();
            if !current.as_ref().is_some_and(|w| w.will_wake(cx.waker())) {
                *current = Some(cx.waker().clone());
            }
        } else {
            let slot = Arc::new(Mutex::new(Some(cx.waker().clone())));
            let listener_slot = Arc::clone(&slot);
            self.future.add_listener(
                move || {
                    if let Some(waker) = listener_slot.lock().take() {
                        waker.wake();
                    }
                },
                &Executor::INLINE,
            );
            self.waker = Some(slot);
        }
        // Completion may have raced the registration above.
        self.ready().map_or(Poll::Pending, Poll::Ready)
    }
}
