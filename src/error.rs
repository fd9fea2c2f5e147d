//! Error types and error handling strategy for fluent futures.
//!
//! Two layers of error exist in this crate:
//!
//! - [`Failure`]: the payload stored in a future's `FAILED` state. It is
//!   reference counted so one failure can be shared by every derived future
//!   that propagates it unchanged.
//! - [`Error`]: what the blocking accessors (`get`, `get_timeout`, ...) hand
//!   back to the caller. It classifies the outcome by [`ErrorKind`] and, for
//!   execution failures, carries the original [`Failure`] as its cause.
//!
//! Errors raised inside user functions (computations, transforms, fallbacks,
//! checked mappers) never escape the combinator that invoked them. They are
//! converted into the derived future's failure state. Panics are isolated the
//! same way and surface as a [`PanicPayload`] failure.
//!
//! # Error Kinds
//!
//! - **Execution**: the bound computation or a combinator function failed
//! - **Cancelled**: the future or one of its dependencies was cancelled
//! - **Timeout**: a blocking accessor's deadline elapsed first
//!
//! An executor that refuses a dependent step does not get a kind of its own:
//! the derived future fails with the
//! [`RejectedExecution`](crate::executor::RejectedExecution) as its cause.

use core::fmt;
use std::any::Any;
use std::sync::Arc;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The computation, or a function applied by a combinator, failed.
    Execution,
    /// The future was cancelled before completing.
    Cancelled,
    /// A blocking accessor's deadline elapsed before the future completed.
    Timeout,
}

impl ErrorKind {
    /// Returns true if the observed future itself is terminal for this kind.
    ///
    /// A timeout says nothing about the future: it is still pending.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Timeout)
    }
}

/// Payload from a caught panic.
///
/// Wraps the panic message so it can travel as an ordinary [`Failure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicPayload {
    message: String,
}

impl PanicPayload {
    /// Creates a new panic payload with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Extracts a readable message from the value produced by `catch_unwind`.
    #[must_use]
    pub fn from_unwind(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        Self { message }
    }

    /// Returns the panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

impl std::error::Error for PanicPayload {}

/// A failure payload stored in a future's `FAILED` state.
///
/// Cloning is cheap. Every future that propagates a failure unchanged holds
/// the same allocation, so `Failure::ptr_eq` can be used to check identity.
#[derive(Clone)]
pub struct Failure {
    inner: Arc<dyn std::error::Error + Send + Sync + 'static>,
}

impl Failure {
    /// Wraps an error value.
    #[must_use]
    pub fn new(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Creates a failure from a plain message.
    #[must_use]
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(Message(message.to_string()))
    }

    /// Returns the underlying error.
    #[must_use]
    pub fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Attempts to view the underlying error as a concrete type.
    #[must_use]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Returns true if this failure was produced by a caught panic.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.downcast_ref::<PanicPayload>().is_some()
    }

    /// Returns true if both handles share the same underlying error.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Failure").field(&self.inner).finish()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

/// Plain-text failure created by [`Failure::msg`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}

/// The error returned by blocking accessors.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    cause: Option<Failure>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            cause: None,
        }
    }

    /// Creates an execution error wrapping the original failure.
    #[must_use]
    pub fn execution(cause: Failure) -> Self {
        Self::new(ErrorKind::Execution).with_cause(cause)
    }

    /// Creates a cancellation error.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled)
    }

    /// Creates a timeout error for a wait of the given length.
    #[must_use]
    pub fn timeout(waited: std::time::Duration) -> Self {
        Self::new(ErrorKind::Timeout).with_message(format!("no result after {waited:?}"))
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this error represents cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Returns true if a blocking accessor gave up waiting.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns true if this error wraps a failed computation.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self.kind, ErrorKind::Execution)
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Attaches the underlying failure.
    #[must_use]
    pub fn with_cause(mut self, cause: Failure) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the wrapped failure, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Failure> {
        self.cause.as_ref()
    }

    /// Consumes the error and returns the wrapped failure, if any.
    #[must_use]
    pub fn into_cause(self) -> Option<Failure> {
        self.cause
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c.as_error() as _)
    }
}

/// A specialized Result type for blocking accessors.
pub type Result<T> = core::result::Result<T, Error>;
