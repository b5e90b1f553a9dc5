//! Error types for the Magma renderer
//!
//! Recoverable failures (device resource creation, structured buffer misuse)
//! are returned as `Error`. Caller contract violations (empty command stack,
//! missing active pass, exhausted draw buffer) are fatal and go through
//! `engine_fatal!` / `engine_assert!`.

use std::fmt;

/// Result type for Magma renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Magma renderer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Graphics device failure reported by the backend
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, texture, framebuffer, ...)
    InvalidResource(String),

    /// Initialization failed (renderer context, scene renderer, ...)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and build an `Error::BackendError` from the formatted message
///
/// # Example
///
/// ```no_run
/// # use magma_renderer::engine_err;
/// # let index = 0;
/// let err = engine_err!("magma::Buffer", "Field index {} out of bounds", index);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::magma::Error::BackendError(message)
    }};
}

/// Log an error and return early with `Error::BackendError`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

/// Same as `engine_err!` but logged at warn level
#[macro_export]
macro_rules! engine_warn_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_warn!($source, "{}", message);
        $crate::magma::Error::BackendError(message)
    }};
}

/// Same as `engine_bail!` but logged at warn level
#[macro_export]
macro_rules! engine_bail_warn {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_warn_err!($source, $($arg)*))
    };
}

/// Log a contract violation with file:line and abort the current operation
///
/// # Example
///
/// ```no_run
/// # use magma_renderer::engine_fatal;
/// engine_fatal!("magma::Renderer", "GetCommand called on an empty command stack");
/// ```
#[macro_export]
macro_rules! engine_fatal {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        panic!("[{}] {}", $source, message)
    }};
}

/// `engine_fatal!` unless the condition holds
#[macro_export]
macro_rules! engine_assert {
    ($cond:expr, $source:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::engine_fatal!($source, $($arg)*);
        }
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
