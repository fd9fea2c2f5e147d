//! Execution contexts for dependent work.
//!
//! The future core never decides *where* work runs. Every place that runs a
//! listener or a combinator step takes an [`Executor`] from the caller:
//!
//! - [`Executor::INLINE`] runs the job immediately on the calling thread. For a
//!   listener registered before completion that is the thread that completes
//!   the future; for one registered afterwards it is the registering thread.
//! - [`Executor::new`] wraps any [`Execute`] implementation: a pool, a queue
//!   drained by an event loop, a test harness, or a plain closure.
//!
//! There is no process-wide default executor. "Inline" is an explicit value
//! chosen at the call site.

use crate::config::{ConfigError, SpawnerConfig};
use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// A unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Error returned when an executor refuses to accept a job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("execution rejected: {reason}")]
pub struct RejectedExecution {
    reason: String,
}

impl RejectedExecution {
    /// Creates a rejection with a human readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns why the job was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Something that can run a unit of work.
///
/// Implementations decide when and on which thread the job runs. A job that
/// is accepted must eventually be run exactly once; a job that cannot be
/// accepted is dropped and reported through [`RejectedExecution`].
pub trait Execute: Send + Sync {
    /// Accepts `job` for execution.
    fn execute(&self, job: Job) -> Result<(), RejectedExecution>;
}

impl<F> Execute for F
where
    F: Fn(Job) -> Result<(), RejectedExecution> + Send + Sync,
{
    fn execute(&self, job: Job) -> Result<(), RejectedExecution> {
        self(job)
    }
}

#[derive(Clone)]
enum Repr {
    Inline,
    Shared(Arc<dyn Execute>),
}

/// A cloneable handle to an execution context.
#[derive(Clone)]
pub struct Executor {
    repr: Repr,
}

impl Executor {
    /// Runs every job immediately on the calling thread.
    pub const INLINE: Self = Self { repr: Repr::Inline };

    /// Returns the inline execution context.
    #[must_use]
    pub const fn inline() -> Self {
        Self::INLINE
    }

    /// Wraps an [`Execute`] implementation.
    #[must_use]
    pub fn new(executor: impl Execute + 'static) -> Self {
        Self {
            repr: Repr::Shared(Arc::new(executor)),
        }
    }

    /// Wraps an already shared [`Execute`] implementation.
    #[must_use]
    pub fn from_shared(executor: Arc<dyn Execute>) -> Self {
        Self {
            repr: Repr::Shared(executor),
        }
    }

    /// Returns true for the inline context.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline)
    }

    /// Hands `job` to this context.
    ///
    /// The inline context runs the job before returning and never rejects.
    pub fn execute(&self, job: Job) -> Result<(), RejectedExecution> {
        match &self.repr {
            Repr::Inline => {
                job();
                Ok(())
            }
            Repr::Shared(executor) => executor.execute(job),
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::INLINE
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Inline => f.write_str("Executor::Inline"),
            Repr::Shared(_) => f.write_str("Executor::Shared(..)"),
        }
    }
}

/// Runs every job on a freshly spawned, named OS thread.
///
/// This is the smallest facility that moves work off the calling thread. It
/// does no pooling or queueing. Thread spawn failures are reported as
/// [`RejectedExecution`].
#[derive(Debug)]
pub struct ThreadSpawner {
    config: SpawnerConfig,
    next_id: AtomicU64,
}

impl ThreadSpawner {
    /// Creates a spawner with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SpawnerConfig::default(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Creates a spawner from explicit settings.
    pub fn with_config(config: SpawnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            next_id: AtomicU64::new(0),
        })
    }

    /// Creates a spawner from defaults overridden by `FLUENT_FUTURE_*` env vars.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = SpawnerConfig::default();
        config.apply_env_overrides()?;
        Self::with_config(config)
    }

    /// Returns the active settings.
    #[must_use]
    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Returns the number of threads spawned so far.
    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl Default for ThreadSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Execute for ThreadSpawner {
    fn execute(&self, job: Job) -> Result<(), RejectedExecution> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut builder =
            thread::Builder::new().name(format!("{}-{id}", self.config.thread_name_prefix));
        if let Some(bytes) = self.config.stack_size {
            builder = builder.stack_size(bytes);
        }
        builder
            .spawn(job)
            .map(drop)
            .map_err(|e| RejectedExecution::new(format!("failed to spawn thread: {e}")))
    }
}
