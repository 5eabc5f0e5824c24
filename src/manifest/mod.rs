//! Manifest model
//!
//! A [`Manifest`] describes one bundle at one OS version: the files it ships and the
//! bundles it `includes`. The manifest of manifests (MoM) uses the same shape with the
//! sentinel name [`MOM_NAME`]; each of its [`File`] entries is a pseudo-file naming a
//! bundle, and its `last_change` is the version to request that bundle's manifest at.

pub mod parse;

use std::path::PathBuf;

pub use parse::{parse_manifest, render_manifest};

/// Name of the manifest of manifests
pub const MOM_NAME: &str = "MoM";

/// Type of a manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link; the content blob holds the link target
    Link,
    /// Bundle manifest pseudo-file (MoM entries only)
    Manifest,
}

impl FileKind {
    /// Flag character used in the manifest text format
    pub fn as_char(self) -> char {
        match self {
            FileKind::File => 'F',
            FileKind::Directory => 'D',
            FileKind::Link => 'L',
            FileKind::Manifest => 'M',
        }
    }

    /// Parse a flag character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'F' => Some(FileKind::File),
            'D' => Some(FileKind::Directory),
            'L' => Some(FileKind::Link),
            'M' => Some(FileKind::Manifest),
            _ => None,
        }
    }
}

/// One entry of a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Absolute path relative to the system root, or a bundle name for MoM entries
    pub filename: String,

    /// Version at which this entry's content last changed
    pub last_change: u32,

    /// Content fingerprint; opaque to resolution and consolidation
    pub hash: String,

    /// Entry type
    pub kind: FileKind,

    /// File was removed from the bundle at `last_change`
    pub is_deleted: bool,

    /// File must never be overwritten by the updater
    pub do_not_update: bool,

    /// Location of the staged copy once the file has been materialized
    pub staging: Option<PathBuf>,
}

impl File {
    /// Create a regular, live file entry
    pub fn new(filename: impl Into<String>, last_change: u32, hash: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            last_change,
            hash: hash.into(),
            kind: FileKind::File,
            is_deleted: false,
            do_not_update: false,
            staging: None,
        }
    }

    /// Create a directory entry
    pub fn directory(filename: impl Into<String>, last_change: u32) -> Self {
        Self {
            kind: FileKind::Directory,
            ..Self::new(filename, last_change, "")
        }
    }

    /// Create a MoM entry for a bundle
    pub fn bundle(name: impl Into<String>, last_change: u32, hash: impl Into<String>) -> Self {
        Self {
            kind: FileKind::Manifest,
            ..Self::new(name, last_change, hash)
        }
    }

    /// Mark the entry as deleted
    #[must_use]
    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Files the installer must skip regardless of configuration
    pub fn is_skipped_on_install(&self) -> bool {
        self.is_deleted || self.do_not_update
    }
}

/// A bundle manifest (or the MoM) at a given version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Bundle name, or [`MOM_NAME`]
    pub name: String,

    /// OS version at which this manifest was last changed
    pub version: u32,

    /// Entries in manifest order
    pub files: Vec<File>,

    /// Names of bundles this bundle depends on
    pub includes: Vec<String>,

    /// Resolved dependency closure; rebuilt by the resolver for each operation
    pub submanifests: Vec<Manifest>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            ..Self::default()
        }
    }

    /// Whether this is the manifest of manifests
    pub fn is_mom(&self) -> bool {
        self.name == MOM_NAME
    }

    /// Find an entry by exact filename
    pub fn find_file(&self, filename: &str) -> Option<&File> {
        self.files.iter().find(|f| f.filename == filename)
    }

    /// Find a bundle's MoM entry by exact name
    pub fn search_bundle(&self, bundle_name: &str) -> Option<&File> {
        self.files
            .iter()
            .find(|f| f.filename == bundle_name && !f.is_deleted)
    }

    /// Names of all bundles listed by a MoM, in manifest order
    pub fn bundle_names(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(|f| !f.is_deleted)
            .map(|f| f.filename.as_str())
    }

    /// Sort entries by filename
    pub fn sort_files_by_name(&mut self) {
        self.files.sort_by(|a, b| a.filename.cmp(&b.filename));
    }
}
