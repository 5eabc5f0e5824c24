//! File list consolidation and deduplication
//!
//! Several bundles may ship the same path. [`consolidate`] folds the file lists of a set
//! of manifests into a [`FileSet`] holding exactly one record per filename, and
//! [`dedupe_against`] strips from a bundle's own list every path some other bundle still
//! needs.
//!
//! Manifests are folded in bundle-name order whatever order they arrive in, so the
//! surviving record for a shared path does not depend on resolution or filesystem order:
//! a live record beats a deleted one, otherwise the later bundle in name order wins.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::manifest::{File, Manifest};

/// One authoritative record per filename, iterated in filename order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: BTreeMap<String, File>,
}

impl FileSet {
    pub fn get(&self, filename: &str) -> Option<&File> {
        self.files.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    pub fn into_files(self) -> Vec<File> {
        self.files.into_values().collect()
    }

    fn insert(&mut self, file: &File) {
        match self.files.entry(file.filename.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(file.clone());
            }
            Entry::Occupied(mut slot) => {
                if !file.is_deleted || slot.get().is_deleted {
                    slot.insert(file.clone());
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a File;
    type IntoIter = std::collections::btree_map::Values<'a, String, File>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.values()
    }
}

/// Every manifest of a closure, plus each manifest's own resolved submanifests
pub fn files_from_bundles(closure: &[Manifest]) -> Vec<&Manifest> {
    let mut out = Vec::new();
    for manifest in closure {
        out.push(manifest);
        out.extend(files_from_bundles(&manifest.submanifests));
    }
    out
}

/// Fold the files of `manifests` into one record per filename
pub fn consolidate<'m>(manifests: impl IntoIterator<Item = &'m Manifest>) -> FileSet {
    let mut ordered: Vec<&Manifest> = manifests.into_iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut set = FileSet::default();
    for manifest in ordered {
        for file in &manifest.files {
            set.insert(file);
        }
    }
    set
}

/// Files of `candidate` that no record in `keep` protects
///
/// `candidate` must be sorted by filename. Any record in `keep`, deleted or not, protects
/// its path.
pub fn dedupe_against(candidate: &[File], keep: &FileSet) -> Vec<File> {
    let mut kept = keep.iter().peekable();
    let mut out = Vec::new();

    for file in candidate {
        while kept
            .peek()
            .is_some_and(|k| k.filename.as_str() < file.filename.as_str())
        {
            kept.next();
        }
        match kept.peek() {
            Some(k) if k.filename == file.filename => {}
            _ => out.push(file.clone()),
        }
    }
    out
}

/// Whether any other bundle of `closure` includes `bundle`
pub fn is_included(bundle: &str, closure: &[Manifest]) -> bool {
    !dependents(bundle, closure).is_empty()
}

/// Names of the bundles in `closure` that include `bundle`, in name order
pub fn dependents(bundle: &str, closure: &[Manifest]) -> Vec<String> {
    let mut names: Vec<String> = closure
        .iter()
        .filter(|m| m.name != bundle && m.includes.iter().any(|i| i == bundle))
        .map(|m| m.name.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}
