//! Subscription registry
//!
//! The set of bundles tracked on this machine. It is loaded once per operation from the
//! marker directory (one empty file per bundle), mutated in memory, and only the deltas
//! are written back by [`Registry::persist`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{self, Result};
use crate::manifest::Manifest;

/// A tracked bundle and the manifest version it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub name: String,

    /// Manifest version; 0 until set from the MoM
    pub version: u32,
}

/// Tracked bundles plus the changes made during the current operation
#[derive(Debug, Clone)]
pub struct Registry {
    bundles_dir: PathBuf,
    subscriptions: BTreeMap<String, Subscription>,
    added: BTreeSet<String>,
    removed: BTreeSet<String>,
}

impl Registry {
    /// Empty registry persisting to `bundles_dir`
    pub fn new(bundles_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundles_dir: bundles_dir.into(),
            subscriptions: BTreeMap::new(),
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    /// Load tracked bundles from the marker directory
    ///
    /// A missing directory means nothing is tracked. Hidden entries are not markers.
    pub fn load(bundles_dir: &Path) -> Result<Self> {
        let mut registry = Self::new(bundles_dir);

        let entries = match fs::read_dir(bundles_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %bundles_dir.display(), "no tracking markers");
                return Ok(registry);
            }
            Err(e) => return Err(error::fs::read_failed(bundles_dir, e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| error::fs::read_failed(bundles_dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            registry.subscriptions.insert(
                name.clone(),
                Subscription { name, version: 0 },
            );
        }

        debug!(count = registry.subscriptions.len(), "loaded tracked bundles");
        Ok(registry)
    }

    /// Whether `name` is tracked or was subscribed during this operation
    pub fn contains(&self, name: &str) -> bool {
        self.subscriptions.contains_key(name)
    }

    /// Whether `name` has a persisted marker
    pub fn is_tracked(&self, name: &str) -> bool {
        self.contains(name) && !self.added.contains(name)
    }

    /// Subscribe to `name`; returns false if it was already subscribed
    pub fn subscribe(&mut self, name: &str, version: u32) -> bool {
        if self.contains(name) {
            return false;
        }
        debug!(bundle = %name, version, "subscribing");
        self.subscriptions.insert(
            name.to_string(),
            Subscription {
                name: name.to_string(),
                version,
            },
        );
        if !self.removed.remove(name) {
            self.added.insert(name.to_string());
        }
        true
    }

    /// Stop tracking `name`; returns false if it was not subscribed
    pub fn untrack(&mut self, name: &str) -> bool {
        if self.subscriptions.remove(name).is_none() {
            return false;
        }
        debug!(bundle = %name, "untracking");
        if !self.added.remove(name) {
            self.removed.insert(name.to_string());
        }
        true
    }

    /// Version recorded for `name`, if subscribed and set
    pub fn version_of(&self, name: &str) -> Option<u32> {
        self.subscriptions
            .get(name)
            .map(|s| s.version)
            .filter(|v| *v > 0)
    }

    /// Subscribed bundle names in name order
    pub fn names(&self) -> Vec<String> {
        self.subscriptions.keys().cloned().collect()
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.values()
    }

    /// Bundles subscribed during this operation, in name order
    pub fn added(&self) -> Vec<String> {
        self.added.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Set every subscription's version from its MoM entry
    ///
    /// Subscriptions whose bundle is gone from the MoM are dropped from memory (their
    /// markers stay) and returned.
    pub fn subscription_versions_from_mom(&mut self, mom: &Manifest) -> Vec<String> {
        let mut dropped = Vec::new();
        self.subscriptions.retain(|name, sub| match mom.search_bundle(name) {
            Some(entry) => {
                sub.version = entry.last_change;
                true
            }
            None => {
                warn!(bundle = %name, version = mom.version, "tracked bundle not in MoM");
                dropped.push(name.clone());
                false
            }
        });
        for name in &dropped {
            self.added.remove(name);
        }
        dropped
    }

    /// Write markers for added bundles and delete markers of removed ones
    pub fn persist(&mut self) -> Result<()> {
        if !self.added.is_empty() {
            fs::create_dir_all(&self.bundles_dir)
                .map_err(|e| error::fs::write_failed(&self.bundles_dir, e))?;
        }

        for name in &self.added {
            let marker = self.bundles_dir.join(name);
            fs::write(&marker, b"").map_err(|e| error::fs::write_failed(&marker, e))?;
            debug!(bundle = %name, "tracking marker written");
        }

        for name in &self.removed {
            let marker = self.bundles_dir.join(name);
            match fs::remove_file(&marker) {
                Ok(()) => debug!(bundle = %name, "tracking marker removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(error::fs::write_failed(&marker, e)),
            }
        }

        self.added.clear();
        self.removed.clear();
        Ok(())
    }
}
