//! Staging and install errors

use super::SwupError;

/// Creates a staging failed error
pub fn staging_failed(path: impl Into<String>, reason: impl Into<String>) -> SwupError {
    SwupError::StagingFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an install failed error
pub fn failed(reason: impl Into<String>) -> SwupError {
    SwupError::InstallFailed {
        reason: reason.into(),
    }
}

/// Creates a content hash mismatch error
pub fn hash_mismatch(
    path: impl Into<String>,
    expected: impl Into<String>,
    actual: impl Into<String>,
) -> SwupError {
    SwupError::HashMismatch {
        path: path.into(),
        expected: expected.into(),
        actual: actual.into(),
    }
}
