//! Manifest loading and parsing errors

use super::SwupError;

/// Creates a MoM not found error
pub fn mom_not_found(version: u32, reason: impl Into<String>) -> SwupError {
    SwupError::MomNotFound {
        version,
        reason: reason.into(),
    }
}

/// Creates a manifest not found error
pub fn not_found(name: impl Into<String>, version: u32, reason: impl Into<String>) -> SwupError {
    SwupError::ManifestNotFound {
        name: name.into(),
        version,
        reason: reason.into(),
    }
}

/// Creates a manifest parse error
pub fn invalid(name: impl Into<String>, line: usize, reason: impl Into<String>) -> SwupError {
    SwupError::ManifestInvalid {
        name: name.into(),
        line,
        reason: reason.into(),
    }
}
