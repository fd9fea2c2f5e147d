//! Configuration for the thread-spawning executor.
//!
//! # Configuration Precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic**: builder methods (`stack_size(..)`) called after the
//!    environment was applied
//! 2. **Environment variables**: `FLUENT_FUTURE_*` values, only when
//!    [`SpawnerConfig::apply_env_overrides`] is called explicitly
//! 3. **Defaults**: built-in defaults from [`SpawnerConfig::default()`]
//!
//! Nothing in the future core reads configuration on its own; an executor is
//! always built and passed in by the caller.
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `FLUENT_FUTURE_THREAD_NAME_PREFIX` | `String` | `thread_name_prefix` |
//! | `FLUENT_FUTURE_THREAD_STACK_SIZE` | `usize` | `stack_size` |

/// Environment variable name for the spawned thread name prefix.
pub const ENV_THREAD_NAME_PREFIX: &str = "FLUENT_FUTURE_THREAD_NAME_PREFIX";
/// Environment variable name for the spawned thread stack size in bytes.
pub const ENV_THREAD_STACK_SIZE: &str = "FLUENT_FUTURE_THREAD_STACK_SIZE";

/// Smallest stack size accepted, in bytes.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

const DEFAULT_THREAD_NAME_PREFIX: &str = "fluent-future";

/// Error produced while building or validating a [`SpawnerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        /// The offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The thread name prefix was empty.
    #[error("thread name prefix must not be empty")]
    EmptyThreadName,
    /// The configured stack size is too small to run a thread.
    #[error("stack size {0} is below the minimum of {min} bytes", min = MIN_STACK_SIZE)]
    StackTooSmall(usize),
}

/// Settings for [`ThreadSpawner`](crate::executor::ThreadSpawner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnerConfig {
    /// Prefix for spawned thread names; a sequence number is appended.
    pub thread_name_prefix: String,
    /// Stack size for spawned threads. `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_owned(),
            stack_size: None,
        }
    }
}

impl SpawnerConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the thread name prefix.
    #[must_use]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Sets the stack size for spawned threads.
    #[must_use]
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Applies `FLUENT_FUTURE_*` environment overrides.
    ///
    /// Only variables that are set are applied. Returns an error if a variable
    /// is set but unparseable.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary lookup, keyed by env var name.
    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_THREAD_NAME_PREFIX) {
            self.thread_name_prefix = val.trim().to_owned();
        }
        if let Some(val) = lookup(ENV_THREAD_STACK_SIZE) {
            let bytes = val
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnv {
                    var: ENV_THREAD_STACK_SIZE,
                    reason: format!("expected unsigned integer, got {val:?} ({e})"),
                })?;
            self.stack_size = Some(bytes);
        }
        Ok(())
    }

    /// Checks that the settings can be used to spawn threads.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_name_prefix.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        match self.stack_size {
            Some(bytes) if bytes < MIN_STACK_SIZE => Err(ConfigError::StackTooSmall(bytes)),
            _ => Ok(()),
        }
    }
}
