//! Terminal outcome of a future.
//!
//! A future is either pending or holds exactly one of:
//!
//! - `Ok(T)`: the computation produced a value
//! - `Err(Failure)`: the computation, or a function applied to its result, failed
//! - `Cancelled`: the future was cancelled before it could complete
//!
//! Combinators branch on an `Outcome` value rather than on unwinding, so every
//! internal step is an ordinary function from one outcome to the next.

use crate::error::{Error, Failure, PanicPayload};
use core::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// The terminal state of a future.
#[derive(Clone)]
pub enum Outcome<T> {
    /// Success with a value.
    Ok(T),
    /// The computation failed.
    Err(Failure),
    /// The future was cancelled.
    Cancelled,
}

impl<T> Outcome<T> {
    /// Returns true if this outcome is `Ok`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true if this outcome is `Err`.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Returns true if this outcome is `Cancelled`.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the failure, if this outcome is `Err`.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Err(f) => Some(f),
            _ => None,
        }
    }

    /// Converts this outcome into the result seen by blocking accessors.
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Self::Ok(v) => Ok(v),
            Self::Err(f) => Err(Error::execution(f)),
            Self::Cancelled => Err(Error::cancelled()),
        }
    }

    /// Maps the success value using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Ok(v) => Outcome::Ok(f(v)),
            Self::Err(e) => Outcome::Err(e),
            Self::Cancelled => Outcome::Cancelled,
        }
    }

    /// Chains a fallible step onto a successful value.
    pub fn and_then<U, F: FnOnce(T) -> Outcome<U>>(self, f: F) -> Outcome<U> {
        match self {
            Self::Ok(v) => f(v),
            Self::Err(e) => Outcome::Err(e),
            Self::Cancelled => Outcome::Cancelled,
        }
    }
}

impl<T, E: Into<Failure>> From<Result<T, E>> for Outcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(e) => Self::Err(e.into()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok(v) => f.debug_tuple("Ok").field(v).finish(),
            Self::Err(e) => f.debug_tuple("Err").field(e).finish(),
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Runs a user function, turning both returned errors and panics into `Err`.
///
/// This is the single boundary where user code is entered: nothing thrown
/// inside `f` reaches the caller.
pub(crate) fn catch<T, E, F>(f: F) -> Outcome<T>
where
    E: Into<Failure>,
    F: FnOnce() -> Result<T, E>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.into(),
        Err(payload) => Outcome::Err(Failure::new(PanicPayload::from_unwind(payload.as_ref()))),
    }
}
