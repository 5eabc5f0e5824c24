//! Error types and handling for swup
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`bundle`]: Bundle and subscription errors
//! - [`manifest`]: Manifest loading and parsing errors
//! - [`install`]: Staging and install errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors

pub mod bundle;
pub mod config;
pub mod fs;
pub mod install;
pub mod manifest;

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Main error type for swup operations
#[derive(Error, Diagnostic, Debug)]
pub enum SwupError {
    // Version errors
    #[error("Unable to determine current OS version from {path}: {reason}")]
    #[diagnostic(
        code(swup::version::unavailable),
        help("The os-release file must contain a numeric VERSION_ID entry")
    )]
    VersionUnavailable { path: String, reason: String },

    // Manifest errors
    #[error("Unable to load Manifest.MoM for version {version}: {reason}")]
    #[diagnostic(
        code(swup::manifest::mom_not_found),
        help("Check that the content location holds manifests for this OS version")
    )]
    MomNotFound { version: u32, reason: String },

    #[error("Manifest for bundle '{name}' version {version} not found: {reason}")]
    #[diagnostic(code(swup::manifest::not_found))]
    ManifestNotFound {
        name: String,
        version: u32,
        reason: String,
    },

    #[error("Invalid manifest '{name}' at line {line}: {reason}")]
    #[diagnostic(code(swup::manifest::invalid))]
    ManifestInvalid {
        name: String,
        line: usize,
        reason: String,
    },

    // Resolution errors
    #[error("Bundle '{name}' not found in Manifest.MoM")]
    #[diagnostic(
        code(swup::bundle::not_found),
        help("Run 'swup bundle-list' to see the bundles available for this OS version")
    )]
    BundleNotFound { name: String },

    #[error("Cannot resolve dependencies of '{bundle}': {reason}")]
    #[diagnostic(code(swup::resolve::failed))]
    ResolutionFailed { bundle: String, reason: String },

    // Bundle / subscription errors
    #[error("Bundle '{name}' does not seem to be installed")]
    #[diagnostic(code(swup::bundle::not_tracked))]
    BundleNotTracked { name: String },

    #[error("Bundle '{name}' is protected and cannot be removed")]
    #[diagnostic(code(swup::bundle::protected))]
    ProtectedBundle { name: String },

    #[error("Bundle name '{name}' is invalid, aborting removal")]
    #[diagnostic(code(swup::bundle::invalid))]
    InvalidBundle { name: String },

    #[error("Bundle '{name}' is required by other installed bundles: {dependents}")]
    #[diagnostic(
        code(swup::bundle::removal_blocked),
        help("Remove the dependent bundles first")
    )]
    RemovalBlocked { name: String, dependents: String },

    #[error("Failed to remove bundle '{name}': {reason}")]
    #[diagnostic(code(swup::bundle::removal_failed))]
    RemovalFailed { name: String, reason: String },

    // Install errors
    #[error("Failed to stage {path}: {reason}")]
    #[diagnostic(code(swup::install::staging_failed))]
    StagingFailed { path: String, reason: String },

    #[error("Bundle installation failed: {reason}")]
    #[diagnostic(code(swup::install::failed))]
    InstallFailed { reason: String },

    #[error("Content hash mismatch for {path}: expected {expected}, got {actual}")]
    #[diagnostic(code(swup::install::hash_mismatch))]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    // Lock errors
    #[error("Another swup process holds the lock: {command} (PID {pid})")]
    #[diagnostic(
        code(swup::lock::held),
        help("If no swup process is running, remove the lock file: {lock_path}")
    )]
    LockHeld {
        command: String,
        pid: u32,
        lock_path: String,
    },

    #[error("Failed to acquire lock {path}: {reason}")]
    #[diagnostic(code(swup::lock::failed))]
    LockFailed { path: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(swup::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(swup::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(swup::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(swup::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(swup::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(swup::fs::io_error))]
    IoError { message: String },
}

impl SwupError {
    /// Exit status reported by the CLI for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SwupError::VersionUnavailable { .. } => ExitCode::CurrentVersion,
            SwupError::MomNotFound { .. } => ExitCode::MomNotFound,
            SwupError::ManifestNotFound { .. } | SwupError::ManifestInvalid { .. } => {
                ExitCode::ManifestLoad
            }
            SwupError::BundleNotFound { .. } | SwupError::ResolutionFailed { .. } => {
                ExitCode::RecurseManifest
            }
            SwupError::BundleNotTracked { .. } | SwupError::ProtectedBundle { .. } => {
                ExitCode::BundleNotTracked
            }
            SwupError::InvalidBundle { .. }
            | SwupError::RemovalBlocked { .. }
            | SwupError::RemovalFailed { .. } => ExitCode::BundleRemove,
            SwupError::StagingFailed { .. }
            | SwupError::InstallFailed { .. }
            | SwupError::HashMismatch { .. } => ExitCode::BundleInstall,
            SwupError::LockHeld { .. } | SwupError::LockFailed { .. } => ExitCode::LockFile,
            SwupError::ConfigNotFound { .. }
            | SwupError::ConfigParseFailed { .. }
            | SwupError::ConfigInvalid { .. } => ExitCode::Config,
            SwupError::FileReadFailed { .. }
            | SwupError::FileWriteFailed { .. }
            | SwupError::IoError { .. } => ExitCode::Failure,
        }
    }

    /// Whether retrying the failed fetch may succeed
    ///
    /// Unreadable or missing content is transient; content that arrived but is malformed
    /// or does not match its hash is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SwupError::MomNotFound { .. }
                | SwupError::ManifestNotFound { .. }
                | SwupError::FileReadFailed { .. }
                | SwupError::IoError { .. }
        )
    }
}

impl From<std::io::Error> for SwupError {
    fn from(err: std::io::Error) -> Self {
        SwupError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SwupError {
    fn from(err: serde_yaml::Error) -> Self {
        SwupError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SwupError {
    fn from(err: serde_json::Error) -> Self {
        SwupError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SwupError>;
