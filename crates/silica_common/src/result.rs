//! Common result and error types for the Silica core.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in Silica), not a
/// user-facing error. User errors are reported through the diagnostics sink
/// or a component-specific error enum.
pub type SilicaResult<T> = Result<T, InternalError>;

/// An internal compiler error indicating a bug in Silica, not a problem
/// with the user's input.
#[derive(Debug, thiserror::Error)]
#[error("internal compiler error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
