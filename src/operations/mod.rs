//! Bundle operations
//!
//! This module provides the high-level operations behind each command:
//! - [`InstallOperation`]: subscribe, resolve, stage, commit, run scripts
//! - [`RemoveOperation`]: safety checks, deduplicated deletion, untracking
//! - [`ListOperation`]: bundles available at the current version, or tracked ones
//!
//! Every operation holds the process lock from start to finish and walks the phases in
//! [`phase`].

pub mod install;
pub mod list;
pub mod phase;
pub mod remove;

use crate::config::Config;
use crate::error::Result;
use crate::lock::ProcessLock;
use crate::manifest::{MOM_NAME, Manifest};
use crate::source::UpdateSource;
use crate::version;

pub use install::{InstallOperation, InstallOutcome};
pub use list::ListOperation;
pub use phase::{Phase, PhaseTracker};
pub use remove::{RemoveOperation, RemoveReport};

/// Resolve the current OS version and load its MoM
fn load_current_mom(
    config: &Config,
    source: &dyn UpdateSource,
    phases: &mut PhaseTracker,
) -> Result<Manifest> {
    let current = phases.check(version::current_version(&config.os_release_path()))?;
    phases.advance(Phase::VersionResolved);

    let mom = phases.check(config.retry.run(MOM_NAME, || source.load_mom(current)))?;
    phases.advance(Phase::MomLoaded);
    Ok(mom)
}

/// Take the process lock for `command`
fn lock(config: &Config, command: &str, phases: &mut PhaseTracker) -> Result<ProcessLock> {
    phases.check(ProcessLock::acquire(&config.lock_path(), command))
}
