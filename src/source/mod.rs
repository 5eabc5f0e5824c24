//! Update content sources
//!
//! Manifests and file content come from an [`UpdateSource`]. The core only ever talks to
//! the trait; transports live behind it. [`DirSource`] serves a local content mirror and
//! is what the command line uses.
//!
//! ## Module Organization
//!
//! - `dir.rs`: [`DirSource`], a version-laid-out directory mirror
//! - `retry.rs`: [`RetryPolicy`], bounded retries with doubling backoff

pub mod dir;
pub mod retry;

use std::path::Path;

use crate::error::Result;
use crate::manifest::{File, FileKind, Manifest};

pub use dir::DirSource;
pub use retry::RetryPolicy;

/// Provider of manifests and file content
pub trait UpdateSource {
    /// Load the manifest of manifests for `version`
    fn load_mom(&self, version: u32) -> Result<Manifest>;

    /// Load a bundle manifest described by its MoM `entry`
    ///
    /// The manifest is requested at `entry.last_change`, not at the current OS version.
    fn load_manifest(&self, entry: &File) -> Result<Manifest>;

    /// Write the content of `file` to `dest`
    ///
    /// For links the content is the link target.
    fn fetch_file(&self, file: &File, dest: &Path) -> Result<()>;

    /// Prefetch the content of every installable file of `bundle` into `staged_dir`
    ///
    /// Deleted and do-not-update files are skipped. Content already present under its hash is not fetched again. Returns the number
    /// of files that could not be fetched; those are retried individually at staging time.
    fn download_pack(&self, bundle: &Manifest, staged_dir: &Path) -> usize {
        let mut failures = 0;
        for file in &bundle.files {
            if file.is_skipped_on_install() || file.kind == FileKind::Directory {
                continue;
            }
            let dest = staged_dir.join(&file.hash);
            if dest.exists() {
                continue;
            }
            if let Err(e) = self.fetch_file(file, &dest) {
                tracing::debug!(file = %file.filename, error = %e, "pack prefetch failed");
                failures += 1;
            }
        }
        failures
    }
}
