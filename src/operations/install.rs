//! Install operation
//!
//! 1. Subscribe to the requested bundles and their dependencies
//! 2. Consolidate the files of the newly subscribed bundles
//! 3. Prefetch their content (best effort)
//! 4. Consolidate the files of every tracked bundle, for path repair
//! 5. Stage each installable file, then rename all of them into place and sync
//! 6. Run completion scripts and persist the new tracking markers

use std::collections::BTreeSet;
use std::fs;

use tracing::{debug, info, warn};

use super::{Phase, PhaseTracker, load_current_mom, lock};
use crate::config::Config;
use crate::consolidate::{self, FileSet};
use crate::error::{self, Result};
use crate::manifest::{File, Manifest};
use crate::progress::ProgressReporter;
use crate::registry::Registry;
use crate::resolver::{AddOutcome, Resolver, Seed};
use crate::scripts::ScriptRunner;
use crate::source::UpdateSource;
use crate::staging::Stager;

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Nothing new to subscribe to; no file was touched
    AlreadyInstalled,
    Installed {
        /// Newly tracked bundles, dependencies included, in name order
        bundles: Vec<String>,
        /// Files renamed into place
        files: usize,
        /// Completion scripts that failed
        script_failures: usize,
    },
}

/// High-level install operation
pub struct InstallOperation<'a> {
    config: &'a Config,
    source: &'a dyn UpdateSource,
    scripts: &'a dyn ScriptRunner,
    phases: PhaseTracker,
}

impl<'a> InstallOperation<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn UpdateSource,
        scripts: &'a dyn ScriptRunner,
    ) -> Self {
        Self {
            config,
            source,
            scripts,
            phases: PhaseTracker::new("bundle-add"),
        }
    }

    pub fn phase(&self) -> &Phase {
        self.phases.current()
    }

    /// Install `names` and everything they include
    pub fn execute(
        &mut self,
        names: &[String],
        progress: &mut dyn ProgressReporter,
    ) -> Result<InstallOutcome> {
        let _lock = lock(self.config, "bundle-add", &mut self.phases)?;
        let mut mom = load_current_mom(self.config, self.source, &mut self.phases)?;

        let mut registry = self
            .phases
            .check(Registry::load(&self.config.bundles_dir()))?;
        let mut resolver = Resolver::new(self.source, self.config.retry);

        let outcome = resolver
            .add_subscriptions(names, &mom, &mut registry)
            .map_err(|e| error::install::failed(e.to_string()));
        if self.phases.check(outcome)? == AddOutcome::NoNewSubscriptions {
            info!("bundle(s) already installed, nothing to do");
            self.phases.advance(Phase::Done);
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        registry.subscription_versions_from_mom(&mom);
        let new_bundles = registry.added();
        let closure = self.phases.check(resolver.resolve_closure(
            &mom,
            &registry,
            Seed::Bundles(&new_bundles),
        ))?;

        let new_set: BTreeSet<&str> = new_bundles.iter().map(String::as_str).collect();
        let new_manifests: Vec<_> = closure
            .iter()
            .filter(|m| new_set.contains(m.name.as_str()))
            .collect();
        let to_install = consolidate::consolidate(new_manifests.iter().copied());

        self.download_packs(&new_manifests);

        mom.submanifests =
            self.phases
                .check(resolver.resolve_closure(&mom, &registry, Seed::Tracked))?;
        self.phases.advance(Phase::DependenciesResolved);

        let system = consolidate::consolidate(consolidate::files_from_bundles(&mom.submanifests));
        self.phases.advance(Phase::FilesConsolidated);
        debug!(
            to_install = to_install.len(),
            system = system.len(),
            "files consolidated"
        );

        let files = self.stage_and_commit(to_install, &system, progress)?;

        let script_failures = self.scripts.run_scripts();
        if script_failures > 0 {
            warn!(failures = script_failures, "some post-install scripts failed");
        }
        self.phases.advance(Phase::ScriptsRun);

        self.phases.check(registry.persist())?;
        self.phases.advance(Phase::Done);
        info!(bundles = ?new_bundles, files, "bundle(s) installed");

        Ok(InstallOutcome::Installed {
            bundles: new_bundles,
            files,
            script_failures,
        })
    }

    /// Best-effort content prefetch for the newly subscribed bundles
    fn download_packs(&self, manifests: &[&Manifest]) {
        let staged_dir = self.config.staged_dir();
        if let Err(e) = fs::create_dir_all(&staged_dir) {
            warn!(error = %e, "cannot create staging directory, skipping pack download");
            return;
        }

        for manifest in manifests {
            let mut pack = (*manifest).clone();
            pack.files.retain(|f| !self.config.is_ignored(&f.filename));
            let failures = self.source.download_pack(&pack, &staged_dir);
            if failures > 0 {
                debug!(bundle = %manifest.name, failures, "pack incomplete, fetching files at staging");
            }
        }
    }

    fn stage_and_commit(
        &mut self,
        to_install: FileSet,
        system: &FileSet,
        progress: &mut dyn ProgressReporter,
    ) -> Result<usize> {
        let mut files: Vec<File> = to_install
            .into_files()
            .into_iter()
            .filter(|f| !f.is_skipped_on_install() && !self.config.is_ignored(&f.filename))
            .collect();

        let mut stager = Stager::new(self.source, self.config);
        progress.start(
            "Installing",
            u64::try_from(files.len()).unwrap_or(u64::MAX),
        );
        for file in &mut files {
            let staged = stager
                .stage_with_repair(file, system)
                .map_err(|e| error::install::failed(e.to_string()));
            if let Err(e) = self.phases.check(staged) {
                progress.abandon();
                return Err(e);
            }
            progress.advance(&file.filename);
        }
        progress.finish();
        self.phases.advance(Phase::Staged);

        let count = self.phases.check(stager.commit())?;
        self.phases.advance(Phase::Committed);
        Ok(count)
    }
}
