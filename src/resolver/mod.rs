//! Dependency resolution for bundles
//!
//! This module handles:
//! - Fetching bundle manifests at the version the MoM (or the registry) names
//! - Computing the transitive `includes` closure of a seed set
//! - Circular dependency detection
//! - Registering new subscriptions, dependencies before dependents
//!
//! ## Module Organization
//!
//! - `closure.rs`: depth-first closure with gray-set cycle detection
//! - `subscribe.rs`: [`Resolver::add_subscriptions`] and [`AddOutcome`]

pub mod closure;
pub mod subscribe;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{self, Result};
use crate::manifest::{File, Manifest};
use crate::registry::Registry;
use crate::source::{RetryPolicy, UpdateSource};

pub use subscribe::AddOutcome;

/// Where a closure starts
#[derive(Debug, Clone, Copy)]
pub enum Seed<'a> {
    /// One bundle, looked up in the MoM
    Bundle(&'a str),
    /// Every subscription in the registry
    Tracked,
    /// An explicit list of bundle names, looked up in the MoM
    Bundles(&'a [String]),
}

/// Resolves bundle closures against one update source
///
/// Manifests are memoized per `(name, version)` for the lifetime of the resolver.
pub struct Resolver<'a> {
    source: &'a dyn UpdateSource,
    retry: RetryPolicy,
    cache: HashMap<(String, u32), Manifest>,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn UpdateSource, retry: RetryPolicy) -> Self {
        Self {
            source,
            retry,
            cache: HashMap::new(),
        }
    }

    /// Fetch the manifest described by a MoM entry, retrying per policy
    ///
    /// Exhausted retries fail with `ResolutionFailed`; a manifest that arrived malformed
    /// fails with `ManifestInvalid`.
    pub fn load_manifest(&mut self, entry: &File) -> Result<Manifest> {
        let key = (entry.filename.clone(), entry.last_change);
        if let Some(manifest) = self.cache.get(&key) {
            return Ok(manifest.clone());
        }

        debug!(bundle = %entry.filename, version = entry.last_change, "fetching manifest");
        let source = self.source;
        let manifest = self
            .retry
            .run(&entry.filename, || source.load_manifest(entry))
            .map_err(|e| {
                if e.is_transient() {
                    error::bundle::resolution_failed(&entry.filename, e.to_string())
                } else {
                    e
                }
            })?;

        self.cache.insert(key, manifest.clone());
        Ok(manifest)
    }

    /// Compute the dependency closure of `seed`
    ///
    /// The result holds each bundle once, in first-seen depth-first order starting with
    /// the seeds. A single-bundle seed missing from the MoM fails with `BundleNotFound`;
    /// tracked bundles missing from both the MoM and the registry are skipped.
    pub fn resolve_closure(
        &mut self,
        mom: &Manifest,
        registry: &Registry,
        seed: Seed<'_>,
    ) -> Result<Vec<Manifest>> {
        let seeds: Vec<File> = match seed {
            Seed::Bundle(name) => vec![
                mom.search_bundle(name)
                    .cloned()
                    .ok_or_else(|| error::bundle::not_found(name))?,
            ],
            Seed::Bundles(names) => names
                .iter()
                .map(|name| {
                    mom.search_bundle(name)
                        .cloned()
                        .ok_or_else(|| error::bundle::not_found(name))
                })
                .collect::<Result<_>>()?,
            Seed::Tracked => registry
                .subscriptions()
                .filter_map(|sub| tracked_entry(mom, registry, &sub.name))
                .collect(),
        };

        let closure = closure::resolve(self, mom, &seeds)?;
        debug!(
            seeds = seeds.len(),
            bundles = closure.len(),
            "resolved dependency closure"
        );
        Ok(closure)
    }
}

/// MoM entry for a tracked bundle, at the registry's version when it has one
fn tracked_entry(mom: &Manifest, registry: &Registry, name: &str) -> Option<File> {
    let from_mom = mom.search_bundle(name).cloned();
    match (from_mom, registry.version_of(name)) {
        (Some(mut entry), Some(version)) => {
            entry.last_change = version;
            Some(entry)
        }
        (Some(entry), None) => Some(entry),
        (None, Some(version)) => Some(File::bundle(name, version, "")),
        (None, None) => {
            tracing::warn!(bundle = %name, "tracked bundle not available in MoM, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SwupError;
    use crate::test_fixtures::{MemorySource, TestSystem};

    fn names(closure: &[Manifest]) -> Vec<&str> {
        closure.iter().map(|m| m.name.as_str()).collect()
    }

    fn source() -> MemorySource {
        MemorySource::new(10)
            .bundle("os-core", &[], &[("/usr/bin/sh", "sh")])
            .bundle("lib-ncurses", &["os-core"], &[("/usr/lib/libncurses.so", "nc")])
            .bundle("editor", &["os-core", "lib-ncurses"], &[("/usr/bin/ed", "ed")])
            .bundle("python", &["os-core"], &[("/usr/bin/python", "py")])
    }

    #[test]
    fn test_single_seed_closure_first_seen_order() {
        let source = source();
        let mom = source.load_mom(10).unwrap();
        let registry = Registry::new("/nonexistent");
        let mut resolver = Resolver::new(&source, RetryPolicy::immediate(1));

        let closure = resolver
            .resolve_closure(&mom, &registry, Seed::Bundle("editor"))
            .unwrap();
        assert_eq!(names(&closure), vec!["editor", "os-core", "lib-ncurses"]);
    }

    #[test]
    fn test_unknown_seed_is_bundle_not_found() {
        let source = source();
        let mom = source.load_mom(10).unwrap();
        let registry = Registry::new("/nonexistent");
        let mut resolver = Resolver::new(&source, RetryPolicy::immediate(1));

        let err = resolver
            .resolve_closure(&mom, &registry, Seed::Bundle("emacs"))
            .unwrap_err();
        assert!(matches!(err, SwupError::BundleNotFound { .. }));
    }

    #[test]
    fn test_tracked_seed_covers_every_subscription() {
        let source = source();
        let mom = source.load_mom(10).unwrap();
        let system = TestSystem::new(10).track(&["python", "editor"]);
        let registry = Registry::load(&system.config.bundles_dir()).unwrap();
        let mut resolver = Resolver::new(&source, RetryPolicy::immediate(1));

        let closure = resolver
            .resolve_closure(&mom, &registry, Seed::Tracked)
            .unwrap();
        let mut got = names(&closure);
        got.sort_unstable();
        assert_eq!(got, vec!["editor", "lib-ncurses", "os-core", "python"]);
    }

    #[test]
    fn test_manifests_are_memoized() {
        let source = source();
        let mom = source.load_mom(10).unwrap();
        let registry = Registry::new("/nonexistent");
        let mut resolver = Resolver::new(&source, RetryPolicy::immediate(1));

        resolver
            .resolve_closure(&mom, &registry, Seed::Bundle("editor"))
            .unwrap();
        resolver
            .resolve_closure(&mom, &registry, Seed::Bundle("python"))
            .unwrap();
        assert_eq!(source.load_count("os-core"), 1);
        assert_eq!(source.load_count("editor"), 1);
    }

    #[test]
    fn test_retry_exhaustion_is_resolution_failed() {
        let source = source().failing("lib-ncurses", 3);
        let mom = source.load_mom(10).unwrap();
        let registry = Registry::new("/nonexistent");
        let mut resolver = Resolver::new(&source, RetryPolicy::immediate(3));

        let err = resolver
            .resolve_closure(&mom, &registry, Seed::Bundle("editor"))
            .unwrap_err();
        assert!(matches!(err, SwupError::ResolutionFailed { ref bundle, .. } if bundle == "lib-ncurses"));
        assert_eq!(source.load_count("lib-ncurses"), 3);
    }

    #[test]
    fn test_malformed_manifest_fails_once_as_invalid() {
        let source = source().corrupt("lib-ncurses");
        let mom = source.load_mom(10).unwrap();
        let registry = Registry::new("/nonexistent");
        let mut resolver = Resolver::new(&source, RetryPolicy::immediate(3));

        let err = resolver
            .resolve_closure(&mom, &registry, Seed::Bundle("editor"))
            .unwrap_err();
        assert!(matches!(err, SwupError::ManifestInvalid { ref name, .. } if name == "lib-ncurses"));
        assert_eq!(source.load_count("lib-ncurses"), 1);
    }

    #[test]
    fn test_transient_failure_recovers_within_retries() {
        let source = source().failing("lib-ncurses", 2);
        let mom = source.load_mom(10).unwrap();
        let registry = Registry::new("/nonexistent");
        let mut resolver = Resolver::new(&source, RetryPolicy::immediate(3));

        let closure = resolver
            .resolve_closure(&mom, &registry, Seed::Bundle("editor"))
            .unwrap();
        assert_eq!(closure.len(), 3);
    }

    #[test]
    fn test_registry_version_overrides_mom_entry() {
        let source = source();
        let mut mom = source.load_mom(10).unwrap();
        let mut registry = Registry::new("/nonexistent");
        registry.subscribe("editor", 7);

        let entry = tracked_entry(&mom, &registry, "editor").unwrap();
        assert_eq!(entry.last_change, 7);

        mom.files.retain(|f| f.filename != "editor");
        let entry = tracked_entry(&mom, &registry, "editor").unwrap();
        assert_eq!(entry.last_change, 7);
        assert!(tracked_entry(&mom, &Registry::new("/nonexistent"), "editor").is_none());
    }
}
