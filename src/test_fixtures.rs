//! Test fixtures shared by unit tests
//!
//! Two building blocks:
//!
//! - [`MemorySource`]: an in-memory [`UpdateSource`] with injectable manifest failures
//!   and load counters
//! - [`TestSystem`]: a scratch system root with an os-release file, tracking markers
//!   and a [`Config`] pointing into it
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{MemorySource, TestSystem};
//!
//! #[test]
//! fn my_test() {
//!     let source = MemorySource::new(10)
//!         .bundle("os-core", &[], &[("/usr/bin/sh", "sh")])
//!         .bundle("editor", &["os-core"], &[("/usr/bin/ed", "ed")]);
//!     let system = TestSystem::new(10).track(&["os-core"]);
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::Config;
use crate::error::{self, Result};
use crate::hash;
use crate::manifest::{File, FileKind, MOM_NAME, Manifest};
use crate::source::UpdateSource;

/// In-memory update content for one OS version
#[derive(Debug, Default)]
pub struct MemorySource {
    version: u32,
    mom: Manifest,
    manifests: HashMap<String, Manifest>,
    blobs: HashMap<String, Vec<u8>>,
    missing_blobs: Vec<String>,
    corrupt: Vec<String>,
    failures: RefCell<HashMap<String, u32>>,
    loads: RefCell<HashMap<String, u32>>,
    fetches: RefCell<u32>,
}

impl MemorySource {
    /// Empty source whose MoM is at `version`
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            version,
            mom: Manifest::new(MOM_NAME, version),
            ..Self::default()
        }
    }

    /// Add a bundle with regular files given as `(path, content)` pairs
    ///
    /// Parent directories of every file are added as directory entries.
    #[must_use]
    pub fn bundle(self, name: &str, includes: &[&str], files: &[(&str, &str)]) -> Self {
        let mut manifest = Manifest::new(name, self.version);
        manifest.includes = includes.iter().map(|s| (*s).to_string()).collect();

        let mut blobs = Vec::new();
        for (path, content) in files {
            for dir in parent_dirs(path) {
                if manifest.find_file(&dir).is_none() {
                    manifest.files.push(File::directory(dir, self.version));
                }
            }
            let hash = hash::hash_bytes(content.as_bytes());
            manifest
                .files
                .push(File::new(*path, self.version, hash.clone()));
            blobs.push((hash, content.as_bytes().to_vec()));
        }

        let mut source = self.manifest(manifest);
        source.blobs.extend(blobs);
        source
    }

    /// Add a fully built manifest, listing it in the MoM at its own version
    #[must_use]
    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.mom
            .files
            .push(File::bundle(&manifest.name, manifest.version, "mom-entry"));
        self.manifests.insert(manifest.name.clone(), manifest);
        self
    }

    /// Store raw content for a hash, e.g. a link target
    #[must_use]
    pub fn blob(mut self, hash: &str, content: &str) -> Self {
        self.blobs
            .insert(hash.to_string(), content.as_bytes().to_vec());
        self
    }

    /// Make every fetch of the content of `filename` fail
    #[must_use]
    pub fn without_blob(mut self, filename: &str) -> Self {
        self.missing_blobs.push(filename.to_string());
        self
    }

    /// Make every manifest load of `name` fail as malformed
    #[must_use]
    pub fn corrupt(mut self, name: &str) -> Self {
        self.corrupt.push(name.to_string());
        self
    }

    /// Make the next `times` manifest loads of `name` fail
    #[must_use]
    pub fn failing(self, name: &str, times: u32) -> Self {
        self.failures.borrow_mut().insert(name.to_string(), times);
        self
    }

    /// Number of manifest load attempts for `name`, failed ones included
    pub fn load_count(&self, name: &str) -> u32 {
        self.loads.borrow().get(name).copied().unwrap_or(0)
    }

    /// Number of file content fetches
    pub fn fetch_count(&self) -> u32 {
        *self.fetches.borrow()
    }
}

fn parent_dirs(path: &str) -> Vec<String> {
    let mut dirs = Vec::new();
    let mut current = Path::new(path).parent();
    while let Some(dir) = current {
        if dir == Path::new("/") || dir.as_os_str().is_empty() {
            break;
        }
        dirs.push(dir.to_string_lossy().into_owned());
        current = dir.parent();
    }
    dirs.reverse();
    dirs
}

impl UpdateSource for MemorySource {
    fn load_mom(&self, version: u32) -> Result<Manifest> {
        if version != self.version {
            return Err(error::manifest::mom_not_found(version, "no such version"));
        }
        Ok(self.mom.clone())
    }

    fn load_manifest(&self, entry: &File) -> Result<Manifest> {
        *self.loads.borrow_mut().entry(entry.filename.clone()).or_default() += 1;

        if self.corrupt.contains(&entry.filename) {
            return Err(error::manifest::invalid(&entry.filename, 1, "missing MANIFEST header"));
        }

        if let Some(remaining) = self.failures.borrow_mut().get_mut(&entry.filename) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(error::manifest::not_found(
                    &entry.filename,
                    entry.last_change,
                    "injected failure",
                ));
            }
        }

        self.manifests.get(&entry.filename).cloned().ok_or_else(|| {
            error::manifest::not_found(&entry.filename, entry.last_change, "not in source")
        })
    }

    fn fetch_file(&self, file: &File, dest: &Path) -> Result<()> {
        *self.fetches.borrow_mut() += 1;
        if file.kind == FileKind::Directory {
            return Ok(());
        }
        if self.missing_blobs.contains(&file.filename) {
            return Err(error::fs::io_error(format!(
                "content for {} unavailable",
                file.filename
            )));
        }
        let content = self
            .blobs
            .get(&file.hash)
            .ok_or_else(|| error::fs::io_error(format!("no blob for {}", file.hash)))?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, content)?;
        Ok(())
    }
}

/// Scratch system root for orchestration tests
pub struct TestSystem {
    pub temp: TempDir,
    pub config: Config,
}

impl TestSystem {
    /// System at OS `version` with nothing tracked
    ///
    /// # Panics
    ///
    /// Panics if the scratch directories cannot be created.
    #[must_use]
    pub fn new(version: u32) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let config = Config::rooted_at(temp.path());
        let os_release = config.os_release_path();
        fs::create_dir_all(os_release.parent().expect("os-release has a parent"))
            .expect("Failed to create usr/lib");
        fs::write(
            &os_release,
            format!("NAME=\"Test OS\"\nVERSION_ID={version}\n"),
        )
        .expect("Failed to write os-release");
        fs::create_dir_all(config.bundles_dir()).expect("Failed to create bundles dir");
        fs::create_dir_all(&config.state_dir).expect("Failed to create state dir");
        Self { temp, config }
    }

    /// Write tracking markers for `names`
    ///
    /// # Panics
    ///
    /// Panics if a marker cannot be written.
    #[must_use]
    pub fn track(self, names: &[&str]) -> Self {
        for name in names {
            fs::write(self.config.bundles_dir().join(name), "")
                .expect("Failed to write tracking marker");
        }
        self
    }

    /// Names with a tracking marker, sorted
    ///
    /// # Panics
    ///
    /// Panics if the marker directory cannot be read.
    pub fn tracked(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.config.bundles_dir())
            .expect("Failed to read bundles dir")
            .filter_map(std::result::Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Location of a manifest filename on the test system
    pub fn path(&self, filename: &str) -> PathBuf {
        self.config.target_path(filename)
    }

    /// Create a file on the test system
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, filename: &str, content: &str) {
        let path = self.path(filename);
        fs::create_dir_all(path.parent().expect("target has a parent"))
            .expect("Failed to create parent directory");
        fs::write(path, content).expect("Failed to write file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_adds_parent_directories() {
        let source = MemorySource::new(10).bundle("editor", &[], &[("/usr/bin/ed", "ed")]);
        let mom = source.load_mom(10).unwrap();
        let editor = source
            .load_manifest(mom.search_bundle("editor").unwrap())
            .unwrap();
        let names: Vec<&str> = editor.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["/usr", "/usr/bin", "/usr/bin/ed"]);
    }

    #[test]
    fn test_failing_manifest_recovers() {
        let source = MemorySource::new(10)
            .bundle("editor", &[], &[])
            .failing("editor", 1);
        let entry = File::bundle("editor", 10, "x");
        assert!(source.load_manifest(&entry).is_err());
        assert!(source.load_manifest(&entry).is_ok());
        assert_eq!(source.load_count("editor"), 2);
    }
}
