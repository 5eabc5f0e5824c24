//! Staging new content next to its final location
//!
//! Installing a file is two steps:
//!
//! 1. **Stage**: fetch the content blob into `<state>/staged/<hash>` (skipped when an
//!    intact blob is already there), then materialize it as a hidden `.update.*` sibling of the
//!    target path. Directories are created in place.
//! 2. **Commit**: rename every staged sibling over its target.
//!
//! Staged siblings are temporary files: if the [`Stager`] is dropped before
//! [`Stager::commit`] finishes, every sibling not yet renamed is removed, and so is every
//! directory the stager created that is still empty.
//!
//! ## Usage
//!
//! ```ignore
//! let mut stager = Stager::new(&source, &config);
//! for file in &mut to_install {
//!     stager.stage_with_repair(file, &system_files)?;
//! }
//! stager.commit()?;
//! ```

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::config::Config;
use crate::consolidate::FileSet;
use crate::error::{self, Result};
use crate::hash;
use crate::manifest::{File, FileKind};
use crate::source::UpdateSource;

const STAGED_PREFIX: &str = ".update.";

/// A staged sibling waiting to be renamed over its target
#[derive(Debug)]
struct PendingRename {
    filename: String,
    staged: TempPath,
    target: PathBuf,
}

/// Stages files for one install and commits them together
pub struct Stager<'a> {
    source: &'a dyn UpdateSource,
    config: &'a Config,
    pending: Vec<PendingRename>,
    created_dirs: Vec<PathBuf>,
    committed: bool,
}

impl<'a> Stager<'a> {
    pub fn new(source: &'a dyn UpdateSource, config: &'a Config) -> Self {
        Self {
            source,
            config,
            pending: Vec::new(),
            created_dirs: Vec::new(),
            committed: false,
        }
    }

    /// Number of files waiting for the rename pass
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Stage one file, recording the staged location in `file.staging`
    pub fn stage(&mut self, file: &mut File) -> Result<()> {
        let target = self.config.target_path(&file.filename);

        match file.kind {
            FileKind::Directory => {
                self.create_dir(&target)
                    .map_err(|e| error::install::staging_failed(&file.filename, e.to_string()))?;
                file.staging = Some(target);
            }
            FileKind::File | FileKind::Link => {
                let blob = self.blob(file)?;
                let staged = materialize(file, &blob, &target)
                    .map_err(|e| error::install::staging_failed(&file.filename, e.to_string()))?;
                debug!(file = %file.filename, staged = %staged.display(), "staged");
                file.staging = Some(staged.to_path_buf());
                self.pending.push(PendingRename {
                    filename: file.filename.clone(),
                    staged,
                    target,
                });
            }
            FileKind::Manifest => {
                return Err(error::install::staging_failed(
                    &file.filename,
                    "manifest entries cannot be installed",
                ));
            }
        }
        Ok(())
    }

    /// Stage one file; on failure repair its missing parent directories once and retry
    ///
    /// Missing ancestors are recreated from their records in `system`, the consolidated
    /// file set of every tracked bundle.
    pub fn stage_with_repair(&mut self, file: &mut File, system: &FileSet) -> Result<()> {
        let Err(first) = self.stage(file) else {
            return Ok(());
        };
        warn!(file = %file.filename, error = %first, "staging failed, repairing path");

        self.repair_path(&file.filename, system)?;
        self.stage(file)
    }

    /// Recreate every missing ancestor directory of `filename`
    pub fn repair_path(&mut self, filename: &str, system: &FileSet) -> Result<()> {
        for ancestor in ancestors(filename) {
            let target = self.config.target_path(&ancestor);
            if target.is_dir() {
                continue;
            }

            let record = system.get(&ancestor).filter(|r| !r.is_deleted);
            match record {
                Some(record) if record.kind == FileKind::Directory => {
                    debug!(path = %ancestor, "recreating missing directory");
                    self.create_dir(&target)
                        .map_err(|e| error::install::staging_failed(&ancestor, e.to_string()))?;
                }
                Some(_) => {
                    return Err(error::install::staging_failed(
                        filename,
                        format!("parent {ancestor} is not a directory in any tracked bundle"),
                    ));
                }
                None => {
                    return Err(error::install::staging_failed(
                        filename,
                        format!("parent {ancestor} is not provided by any tracked bundle"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Rename every staged file over its target, in staging order, then sync
    ///
    /// Returns the number of files renamed. On failure the files not yet renamed are
    /// cleaned up.
    pub fn commit(mut self) -> Result<usize> {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();

        for rename in pending {
            rename.staged.persist(&rename.target).map_err(|e| {
                error::install::failed(format!("cannot rename {} into place: {}", rename.filename, e.error))
            })?;
        }

        self.committed = true;
        sync();
        debug!(count, "staged files committed");
        Ok(count)
    }

    /// Content blob for `file`, fetched into the staging area when missing or corrupt
    fn blob(&self, file: &File) -> Result<PathBuf> {
        let staged_dir = self.config.staged_dir();
        let blob = staged_dir.join(&file.hash);
        if blob.is_file() {
            if hash::hash_file(&blob).is_ok_and(|actual| hash::verify_hash(&file.hash, &actual)) {
                return Ok(blob);
            }
            warn!(file = %file.filename, "cached blob is corrupt, fetching again");
            let _ = fs::remove_file(&blob);
        }

        fs::create_dir_all(&staged_dir).map_err(|e| error::fs::write_failed(&staged_dir, e))?;
        let source = self.source;
        self.config
            .retry
            .run(&file.filename, || source.fetch_file(file, &blob))
            .map_err(|e| error::install::staging_failed(&file.filename, e.to_string()))?;
        Ok(blob)
    }

    fn create_dir(&mut self, target: &Path) -> io::Result<()> {
        match fs::create_dir(target) {
            Ok(()) => {
                self.created_dirs.push(target.to_path_buf());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && target.is_dir() => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for Stager<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if !self.pending.is_empty() {
            debug!(count = self.pending.len(), "discarding staged files");
        }
        self.pending.clear();

        for dir in self.created_dirs.iter().rev() {
            let is_empty = fs::read_dir(dir)
                .map(|mut d| d.next().is_none())
                .unwrap_or(false);
            if is_empty {
                let _ = fs::remove_dir(dir);
            }
        }
    }
}

/// Write the content of `blob` as a `.update.*` sibling of `target`
fn materialize(file: &File, blob: &Path, target: &Path) -> io::Result<TempPath> {
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "target has no parent"))?;
    let builder = {
        let mut builder = Builder::new();
        builder.prefix(STAGED_PREFIX);
        builder
    };

    if file.kind == FileKind::Link {
        let link_target = fs::read_to_string(blob)?;
        let staged = builder.make_in(parent, |path| symlink(link_target.trim_end(), path))?;
        return Ok(staged.into_temp_path());
    }

    let mut staged = builder.tempfile_in(parent)?;
    let mut content = fs::File::open(blob)?;
    io::copy(&mut content, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    Ok(staged.into_temp_path())
}

#[cfg(unix)]
fn symlink(link_target: &str, path: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link_target, path)
}

#[cfg(not(unix))]
fn symlink(_link_target: &str, _path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        "symbolic links require a unix host",
    ))
}

/// Flush file system buffers
#[cfg(unix)]
pub fn sync() {
    rustix::fs::sync();
}

#[cfg(not(unix))]
pub fn sync() {}

/// Proper ancestors of an absolute filename, outermost first, excluding `/`
fn ancestors(filename: &str) -> Vec<String> {
    let mut dirs: Vec<String> = Path::new(filename)
        .ancestors()
        .skip(1)
        .filter(|p| *p != Path::new("/") && !p.as_os_str().is_empty())
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    dirs.reverse();
    dirs
}
