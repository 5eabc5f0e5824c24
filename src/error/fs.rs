//! File system errors

use std::path::Path;

use super::SwupError;

/// Creates a file read failed error
pub fn read_failed(path: &Path, err: impl std::fmt::Display) -> SwupError {
    SwupError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: &Path, err: impl std::fmt::Display) -> SwupError {
    SwupError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> SwupError {
    SwupError::IoError {
        message: message.into(),
    }
}
