//! Configuration errors

use super::SwupError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> SwupError {
    SwupError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> SwupError {
    SwupError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> SwupError {
    SwupError::ConfigInvalid {
        message: message.into(),
    }
}
