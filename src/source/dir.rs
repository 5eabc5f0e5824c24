//! Local content mirror
//!
//! ```text
//! <root>/<version>/Manifest.MoM
//! <root>/<version>/Manifest.<bundle>
//! <root>/<version>/files/<hash>
//! ```
//!
//! A bundle manifest lives under the version it last changed at, and so does each file
//! blob. Blobs are verified against the manifest hash before being handed out.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::UpdateSource;
use crate::error::{self, Result, SwupError};
use crate::hash;
use crate::manifest::{File, FileKind, MOM_NAME, Manifest, parse_manifest};

/// [`UpdateSource`] backed by a directory tree
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a manifest in the mirror
    pub fn manifest_path(&self, version: u32, name: &str) -> PathBuf {
        self.root
            .join(version.to_string())
            .join(format!("Manifest.{name}"))
    }

    /// Location of a file blob in the mirror
    pub fn blob_path(&self, version: u32, hash: &str) -> PathBuf {
        self.root
            .join(version.to_string())
            .join("files")
            .join(hash)
    }

    fn read_manifest(&self, version: u32, name: &str) -> Result<Manifest> {
        let path = self.manifest_path(version, name);
        debug!(path = %path.display(), "reading manifest");
        let content = fs::read_to_string(&path)
            .map_err(|e| error::manifest::not_found(name, version, e.to_string()))?;
        parse_manifest(name, &content)
    }
}

impl UpdateSource for DirSource {
    fn load_mom(&self, version: u32) -> Result<Manifest> {
        self.read_manifest(version, MOM_NAME).map_err(|e| match e {
            SwupError::ManifestInvalid { .. } => e,
            other => error::manifest::mom_not_found(version, other.to_string()),
        })
    }

    fn load_manifest(&self, entry: &File) -> Result<Manifest> {
        self.read_manifest(entry.last_change, &entry.filename)
    }

    fn fetch_file(&self, file: &File, dest: &Path) -> Result<()> {
        if file.kind == FileKind::Directory {
            return Ok(());
        }

        let blob = self.blob_path(file.last_change, &file.hash);
        let content = fs::read(&blob).map_err(|e| error::fs::read_failed(&blob, e))?;

        let actual = hash::hash_bytes(&content);
        if !hash::verify_hash(&file.hash, &actual) {
            return Err(error::install::hash_mismatch(
                file.filename.clone(),
                file.hash.clone(),
                actual,
            ));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| error::fs::write_failed(parent, e))?;
        }
        fs::write(dest, content).map_err(|e| error::fs::write_failed(dest, e))
    }
}
