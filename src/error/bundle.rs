//! Bundle and subscription errors

use super::SwupError;

/// Creates a bundle not found error
pub fn not_found(name: impl Into<String>) -> SwupError {
    SwupError::BundleNotFound { name: name.into() }
}

/// Creates a bundle not tracked error
pub fn not_tracked(name: impl Into<String>) -> SwupError {
    SwupError::BundleNotTracked { name: name.into() }
}

/// Creates a protected bundle error
pub fn protected(name: impl Into<String>) -> SwupError {
    SwupError::ProtectedBundle { name: name.into() }
}

/// Creates an invalid bundle error
pub fn invalid(name: impl Into<String>) -> SwupError {
    SwupError::InvalidBundle { name: name.into() }
}

/// Creates a removal blocked error
pub fn removal_blocked(name: impl Into<String>, dependents: impl Into<String>) -> SwupError {
    SwupError::RemovalBlocked {
        name: name.into(),
        dependents: dependents.into(),
    }
}

/// Creates a removal failed error
pub fn removal_failed(name: impl Into<String>, reason: impl Into<String>) -> SwupError {
    SwupError::RemovalFailed {
        name: name.into(),
        reason: reason.into(),
    }
}

/// Creates a resolution failed error
pub fn resolution_failed(bundle: impl Into<String>, reason: impl Into<String>) -> SwupError {
    SwupError::ResolutionFailed {
        bundle: bundle.into(),
        reason: reason.into(),
    }
}
