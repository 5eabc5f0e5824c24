//! Registering new subscriptions for an install

use std::collections::HashSet;

use tracing::{debug, warn};

use super::Resolver;
use super::closure::cycle_chain;
use crate::error::{self, Result};
use crate::manifest::Manifest;
use crate::registry::Registry;

/// Outcome of [`Resolver::add_subscriptions`] when no fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Every requested bundle and every bundle it includes was already subscribed
    NoNewSubscriptions,
    /// At least one bundle was subscribed
    Added,
}

impl<'a> Resolver<'a> {
    /// Subscribe to `names` and everything they include
    ///
    /// Names missing from the MoM are reported and skipped; if none of `names` is in the
    /// MoM the call fails with `BundleNotFound`. Includes are walked even below bundles
    /// that are already subscribed, so a dependency added in a later release is picked up.
    /// Dependencies are registered before the bundles that include them. A manifest that
    /// cannot be fetched aborts with the fetch error; subscriptions made before that stay
    /// in memory.
    pub fn add_subscriptions(
        &mut self,
        names: &[String],
        mom: &Manifest,
        registry: &mut Registry,
    ) -> Result<AddOutcome> {
        let mut added = false;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut unknown = Vec::new();

        for name in names {
            if mom.search_bundle(name).is_none() {
                warn!(bundle = %name, version = mom.version, "bundle not found in MoM, skipping");
                unknown.push(name.as_str());
                continue;
            }
            added |=
                self.subscribe_with_includes(name, mom, registry, &mut path, &mut visited)?;
        }

        if !names.is_empty() && unknown.len() == names.len() {
            return Err(error::bundle::not_found(unknown.join(", ")));
        }

        if added {
            Ok(AddOutcome::Added)
        } else {
            debug!("no new subscriptions");
            Ok(AddOutcome::NoNewSubscriptions)
        }
    }

    fn subscribe_with_includes(
        &mut self,
        name: &str,
        mom: &Manifest,
        registry: &mut Registry,
        path: &mut Vec<String>,
        visited: &mut HashSet<String>,
    ) -> Result<bool> {
        if path.iter().any(|n| n == name) {
            return Err(error::bundle::resolution_failed(
                name,
                format!("circular dependency: {}", cycle_chain(path, name)),
            ));
        }
        if visited.contains(name) {
            return Ok(false);
        }

        let Some(entry) = mom.search_bundle(name).cloned() else {
            if registry.contains(name) {
                warn!(bundle = %name, version = mom.version, "subscribed bundle not found in MoM");
                return Ok(false);
            }
            return Err(error::bundle::resolution_failed(
                path.last().map_or(name, String::as_str),
                format!("included bundle '{name}' not found in Manifest.MoM"),
            ));
        };
        let manifest = self.load_manifest(&entry)?;

        path.push(name.to_string());
        let mut added = false;
        for include in &manifest.includes {
            added |= self.subscribe_with_includes(include, mom, registry, path, visited)?;
        }
        path.pop();
        visited.insert(name.to_string());

        if !registry.contains(name) {
            added |= registry.subscribe(name, entry.last_change);
        }
        Ok(added)
    }
}
