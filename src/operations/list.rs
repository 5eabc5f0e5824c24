//! List operation

use super::{PhaseTracker, load_current_mom, lock};
use crate::config::Config;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::registry::Registry;
use crate::source::UpdateSource;

/// High-level list operation
pub struct ListOperation<'a> {
    config: &'a Config,
    source: &'a dyn UpdateSource,
    phases: PhaseTracker,
}

impl<'a> ListOperation<'a> {
    pub fn new(config: &'a Config, source: &'a dyn UpdateSource) -> Self {
        Self {
            config,
            source,
            phases: PhaseTracker::new("bundle-list"),
        }
    }

    /// Bundles available at the current OS version, in MoM order
    pub fn available(&mut self) -> Result<Vec<String>> {
        let _lock = lock(self.config, "bundle-list", &mut self.phases)?;
        let mom = load_current_mom(self.config, self.source, &mut self.phases)?;
        Ok(bundle_names(&mom))
    }

    /// Tracked bundles, in name order
    pub fn installed(&mut self) -> Result<Vec<String>> {
        let _lock = lock(self.config, "bundle-list", &mut self.phases)?;
        let registry = self
            .phases
            .check(Registry::load(&self.config.bundles_dir()))?;
        Ok(registry.names())
    }
}

fn bundle_names(mom: &Manifest) -> Vec<String> {
    mom.bundle_names().map(str::to_string).collect()
}
