//! Error types for tileprim

use thiserror::Error;

/// Result type alias using tileprim's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tileprim operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument provided to an operation
    ///
    /// Detected before any work is enqueued; the call has no partial effects.
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// The runtime rejected a kernel launch
    #[error("Launch of '{kernel}' failed: {reason}")]
    LaunchFailed {
        /// Name of the kernel that could not be enqueued
        kernel: &'static str,
        /// Reason for the rejection
        reason: String,
    },

    /// A fault surfaced while draining a stream
    ///
    /// In asynchronous mode this is reported by whichever synchronization
    /// observes it first, which is not necessarily the synchronization that
    /// follows the operation that actually faulted.
    #[error("Asynchronous execution fault: {reason}")]
    AsyncExecution {
        /// Description of the fault
        reason: String,
    },

    /// Out of memory while allocating a buffer or scratch space
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a launch failure error
    pub fn launch_failed(kernel: &'static str, reason: impl Into<String>) -> Self {
        Self::LaunchFailed {
            kernel,
            reason: reason.into(),
        }
    }

    /// Status category of this error
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidArgument { .. } => Status::ArgumentError,
            Self::LaunchFailed { .. } | Self::OutOfMemory { .. } | Self::Backend(_) => {
                Status::LaunchError
            }
            Self::AsyncExecution { .. } => Status::AsyncExecutionError,
        }
    }
}

/// Outcome category of an operation
///
/// Mirrors the status codes a device library reports. Use [`Status::of`] to
/// classify a `Result`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation was enqueued (and, in debug mode, completed) successfully
    Success,
    /// Malformed input detected before any work was issued
    ArgumentError,
    /// The launch request itself was rejected
    LaunchError,
    /// A fault surfaced at a synchronization point
    AsyncExecutionError,
}

impl Status {
    /// Classify a result
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => e.status(),
        }
    }

    /// Returns true for [`Status::Success`]
    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::ArgumentError => "argument error",
            Self::LaunchError => "launch error",
            Self::AsyncExecutionError => "async execution error",
        };
        f.write_str(name)
    }
}
