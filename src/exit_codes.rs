//! Exit codes for the swup CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.
//! The numbering follows the updater's historical error numbers so existing
//! automation keeps working.

/// Exit codes for swup operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success, including "nothing to do"
    Ok = 0,

    /// Unclassified failure (I/O and similar)
    Failure = 1,

    /// Bundle removal failed or was refused
    BundleRemove = 3,

    /// Manifest of manifests could not be loaded
    MomNotFound = 4,

    /// Dependency resolution over bundle manifests failed
    RecurseManifest = 8,

    /// Another instance holds the process lock
    LockFile = 9,

    /// Bundle is not installed on this system
    BundleNotTracked = 13,

    /// A bundle manifest could not be loaded
    ManifestLoad = 14,

    /// Bundle installation failed
    BundleInstall = 18,

    /// Current OS version could not be determined
    CurrentVersion = 19,

    /// Configuration could not be loaded
    Config = 20,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates any error.
    pub fn is_error(self) -> bool {
        self != ExitCode::Ok
    }

    /// Get the code name as a string constant.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::Failure => "EXIT_FAILURE",
            ExitCode::BundleRemove => "EBUNDLE_REMOVE",
            ExitCode::MomNotFound => "EMOM_NOTFOUND",
            ExitCode::RecurseManifest => "ERECURSE_MANIFEST",
            ExitCode::LockFile => "ELOCK_FILE",
            ExitCode::BundleNotTracked => "EBUNDLE_NOT_TRACKED",
            ExitCode::ManifestLoad => "EMANIFEST_LOAD",
            ExitCode::BundleInstall => "EBUNDLE_INSTALL",
            ExitCode::CurrentVersion => "ECURRENT_VERSION",
            ExitCode::Config => "ECONFIG",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
