//! Operation phases
//!
//! ```text
//! Init -> VersionResolved -> MomLoaded -> DependenciesResolved -> FilesConsolidated
//!      -> Staged -> Committed -> ScriptsRun -> Done
//! ```
//!
//! Any phase may move to `Failed`. Removal skips the staging phases.

use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Init,
    VersionResolved,
    MomLoaded,
    DependenciesResolved,
    FilesConsolidated,
    Staged,
    Committed,
    ScriptsRun,
    Done,
    Failed(String),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Init => write!(f, "init"),
            Phase::VersionResolved => write!(f, "version-resolved"),
            Phase::MomLoaded => write!(f, "mom-loaded"),
            Phase::DependenciesResolved => write!(f, "dependencies-resolved"),
            Phase::FilesConsolidated => write!(f, "files-consolidated"),
            Phase::Staged => write!(f, "staged"),
            Phase::Committed => write!(f, "committed"),
            Phase::ScriptsRun => write!(f, "scripts-run"),
            Phase::Done => write!(f, "done"),
            Phase::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Current phase of one operation, logging every transition
#[derive(Debug)]
pub struct PhaseTracker {
    operation: &'static str,
    current: Phase,
}

impl PhaseTracker {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            current: Phase::Init,
        }
    }

    pub fn current(&self) -> &Phase {
        &self.current
    }

    /// Move to `next`
    pub fn advance(&mut self, next: Phase) {
        debug!(operation = self.operation, from = %self.current, to = %next, "phase");
        self.current = next;
    }

    /// Pass `result` through, moving to `Failed` when it is an error
    pub fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ref e) = result {
            warn!(operation = self.operation, phase = %self.current, error = %e, "operation failed");
            self.current = Phase::Failed(e.to_string());
        }
        result
    }
}
