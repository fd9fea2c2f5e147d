//! Fluent futures: composable single-assignment results for threaded code.
//!
//! # Overview
//!
//! A future here is a handle to a value that becomes available exactly once,
//! produced by a computation running somewhere else. Code that launches
//! background work composes the eventual results through combinators instead
//! of synchronizing by hand.
//!
//! # Core Guarantees
//!
//! - **Single assignment**: a future leaves `PENDING` once; concurrent
//!   completers race and exactly one wins
//! - **No lost listeners**: every listener runs exactly once, whether it was
//!   registered before or after completion
//! - **No ambient executor**: every place that runs dependent work takes an
//!   explicit [`Executor`]; [`Executor::INLINE`] is a value, not a default
//! - **Contained failures**: errors and panics inside user functions become the
//!   derived future's failure and never unwind into the caller
//! - **Upstream cancellation**: cancelling a derived future cancels what it
//!   was derived from
//!
//! # Module Structure
//!
//! - [`cell`]: Completion cell, the state machine behind every native future
//! - [`task`]: Future task binding a computation to a cell
//! - [`promise`]: Settable future, the write side owned by combinators
//! - [`future`]: The [`ListenableFuture`] capability set and the [`FluentFuture`] decorator
//! - [`combinator`]: Transform, fallback, callbacks, checked conversion, combine
//! - [`futures`]: Factory helpers (`immediate`, `submit`, ...)
//! - [`executor`]: Execution contexts and a thread-per-job spawner
//! - [`config`]: Spawner configuration with environment overrides
//! - [`wait`]: Bridge to `std::future::Future`
//! - [`error`]: Error types
//! - [`outcome`]: Tagged terminal outcome
//!
//! # Example
//!
//! ```
//! use fluent_future::{combinator::combine, Executor, FutureTask, ThreadSpawner};
//!
//! let pool = Executor::new(ThreadSpawner::new());
//! let tasks: Vec<_> = (1..=3)
//!     .map(|n| FutureTask::new(move || Ok::<_, std::fmt::Error>(n * 10)))
//!     .collect();
//! let total = combine(tasks.iter().map(FutureTask::future))
//!     .transform(|values| values.into_iter().sum::<i32>());
//! for task in tasks {
//!     pool.execute(task.into_job()).unwrap();
//! }
//! assert_eq!(total.get().unwrap(), 60);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod cell;
pub mod combinator;
pub mod config;
pub mod error;
pub mod executor;
pub mod future;
pub mod futures;
mod listener;
pub mod outcome;
pub mod promise;
pub mod task;
pub mod tracing_compat;
pub mod wait;

#[cfg(test)]
mod test_utils;

// Re-exports for convenient access to core types
pub use cell::CompletionCell;
pub use combinator::{combine, combine_on, CheckedFuture, FutureCallback, OnFailure, OnSuccess};
pub use config::{ConfigError, SpawnerConfig};
pub use error::{Error, ErrorKind, Failure, PanicPayload, Result};
pub use executor::{Execute, Executor, Job, RejectedExecution, ThreadSpawner};
pub use future::{FluentFuture, ListenableFuture};
pub use outcome::Outcome;
pub use promise::Promise;
pub use task::{CancelToken, FutureTask};
pub use wait::Wait;
