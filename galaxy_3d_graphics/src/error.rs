//! Error types for the Galaxy3D graphics layer
//!
//! This module defines the error type used throughout the scene graph and
//! the post-processing pipeline. All errors are local and synchronous: they
//! are returned to the immediate caller, never retried and never swallowed.

use std::fmt;

/// Result type for Galaxy3D graphics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D graphics errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid configuration at the point of use (missing context buffer,
    /// unsupported encoding, numeric property out of range)
    Configuration(String),

    /// A structural invariant would be broken (clone type mismatch,
    /// node already owned by another parent, cycles)
    InvariantViolation(String),

    /// The node handle refers to a node that has been disposed
    NodeDisposed(String),

    /// Degenerate input that would otherwise produce NaN (zero-length
    /// directions, identical look-at position and target)
    DegenerateInput(String),

    /// Backend-specific error (GPU device, lock poisoning, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, effect, buffer, etc.)
    InvalidResource(String),

    /// Initialization failed (device, effects, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
            Error::NodeDisposed(msg) => write!(f, "Node disposed: {}", msg),
            Error::DegenerateInput(msg) => write!(f, "Degenerate input: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an error, logging it at ERROR severity first.
///
/// The first form produces a `BackendError`, the second form names the
/// variant explicitly.
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("galaxy3d::Device", "Lost device");
/// let err = engine_err!(Configuration, "galaxy3d::BlurFilter",
///     "Number of samples must be odd (got {})", n);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:literal, $($arg:tt)*) => {
        $crate::engine_err!(BackendError, $source, $($arg)*)
    };
    ($kind:ident, $source:literal, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::$kind(message)
    }};
}

/// Log an error and return it from the current function.
///
/// Same forms as `engine_err!`.
#[macro_export]
macro_rules! engine_bail {
    ($($arg:tt)*) => {
        return Err($crate::engine_err!($($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
