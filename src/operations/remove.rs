//! Remove operation
//!
//! A bundle is removed only when nothing else still needs it: protected bundles are
//! refused outright, and a bundle included by any other tracked bundle is blocked. Only
//! the files no remaining bundle ships are deleted.

use std::fs;
use std::io::ErrorKind;

use tracing::{debug, info, warn};

use super::{Phase, PhaseTracker, load_current_mom, lock};
use crate::config::Config;
use crate::consolidate;
use crate::error::{self, Result, SwupError};
use crate::manifest::{File, FileKind};
use crate::registry::Registry;
use crate::resolver::{Resolver, Seed};
use crate::source::UpdateSource;

/// Result of a successful removal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveReport {
    /// Paths deleted from the system
    pub deleted: usize,
    /// Directories left in place because something else lives in them
    pub kept_dirs: usize,
}

/// High-level remove operation
pub struct RemoveOperation<'a> {
    config: &'a Config,
    source: &'a dyn UpdateSource,
    phases: PhaseTracker,
}

impl<'a> RemoveOperation<'a> {
    pub fn new(config: &'a Config, source: &'a dyn UpdateSource) -> Self {
        Self {
            config,
            source,
            phases: PhaseTracker::new("bundle-remove"),
        }
    }

    pub fn phase(&self) -> &Phase {
        self.phases.current()
    }

    /// Remove bundle `name` and untrack it
    ///
    /// Files that cannot be deleted are reported with `RemovalFailed` after the bundle
    /// has been untracked.
    pub fn execute(&mut self, name: &str) -> Result<RemoveReport> {
        if self.config.is_protected(name) {
            return self.phases.check(Err(error::bundle::protected(name)));
        }

        let _lock = lock(self.config, "bundle-remove", &mut self.phases)?;

        let mut registry = self
            .phases
            .check(Registry::load(&self.config.bundles_dir()))?;
        if !registry.is_tracked(name) {
            return self.phases.check(Err(error::bundle::not_tracked(name)));
        }

        let mut mom = load_current_mom(self.config, self.source, &mut self.phases)?;
        let Some(entry) = mom.search_bundle(name).cloned() else {
            return self.phases.check(Err(error::bundle::invalid(name)));
        };

        registry.subscription_versions_from_mom(&mom);
        registry.untrack(name);

        let mut resolver = Resolver::new(self.source, self.config.retry);
        mom.submanifests =
            self.phases
                .check(resolver.resolve_closure(&mom, &registry, Seed::Tracked))?;
        self.phases.advance(Phase::DependenciesResolved);

        let dependents = consolidate::dependents(name, &mom.submanifests);
        if !dependents.is_empty() {
            return self.phases.check(Err(error::bundle::removal_blocked(
                name,
                dependents.join(", "),
            )));
        }

        let keep = consolidate::consolidate(consolidate::files_from_bundles(&mom.submanifests));
        let mut own = self.phases.check(resolver.load_manifest(&entry))?;
        own.sort_files_by_name();
        let removable = consolidate::dedupe_against(&own.files, &keep);
        self.phases.advance(Phase::FilesConsolidated);
        debug!(
            bundle = %name,
            own = own.files.len(),
            removable = removable.len(),
            "files deduplicated"
        );

        let (report, failures) = self.delete_files(&removable);

        self.phases.check(registry.persist())?;
        self.phases.advance(Phase::Done);

        if !failures.is_empty() {
            return self.phases.check(Err(removal_failure(name, &failures)));
        }

        info!(bundle = %name, deleted = report.deleted, "bundle removed");
        Ok(report)
    }

    /// Delete files children first; directories only when empty
    fn delete_files(&self, removable: &[File]) -> (RemoveReport, Vec<String>) {
        let mut report = RemoveReport::default();
        let mut failures = Vec::new();

        for file in removable.iter().rev() {
            if file.is_deleted || self.config.is_ignored(&file.filename) {
                continue;
            }
            let path = self.config.target_path(&file.filename);

            let result = if file.kind == FileKind::Directory {
                fs::remove_dir(&path)
            } else {
                fs::remove_file(&path)
            };

            match result {
                Ok(()) => report.deleted += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
                    debug!(path = %file.filename, "directory still in use, keeping");
                    report.kept_dirs += 1;
                }
                Err(e) => {
                    warn!(path = %file.filename, error = %e, "cannot delete");
                    failures.push(file.filename.clone());
                }
            }
        }

        (report, failures)
    }
}

/// Error naming the first few files that could not be deleted
fn removal_failure(name: &str, failures: &[String]) -> SwupError {
    let shown: Vec<&str> = failures.iter().take(5).map(String::as_str).collect();
    let more = failures.len().saturating_sub(shown.len());
    let mut reason = format!("could not delete {}", shown.join(", "));
    if more > 0 {
        reason = format!("{reason} and {more} more");
    }
    error::bundle::removal_failed(name, reason)
}
