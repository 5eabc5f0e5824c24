//! Common test utilities for swup integration tests

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use swup::hash::hash_bytes;
use swup::manifest::{File, MOM_NAME, Manifest, render_manifest};
use swup::source::DirSource;
use tempfile::TempDir;

/// A scratch system root, state directory and content mirror
#[allow(dead_code)]
pub struct TestSystem {
    /// Temporary directory
    pub temp: TempDir,
    /// Root of the managed system
    pub root: PathBuf,
    /// Updater state directory
    pub state: PathBuf,
    /// Content mirror
    pub content: PathBuf,
    /// Configuration file passed with `--config`
    pub config: PathBuf,
    version: u32,
    mom: Manifest,
}

#[allow(dead_code)]
impl TestSystem {
    /// Create a system at OS `version` with an empty mirror and nothing tracked
    pub fn new(version: u32) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("root");
        let state = temp.path().join("state");
        let content = temp.path().join("content");
        let config = temp.path().join("config.yaml");

        let system = Self {
            temp,
            root,
            state,
            content,
            config,
            version,
            mom: Manifest::new(MOM_NAME, version),
        };
        system.write_file(
            "/usr/lib/os-release",
            &format!("NAME=\"Test OS\"\nVERSION_ID={version}\n"),
        );
        fs::create_dir_all(system.bundles_dir()).expect("Failed to create bundles dir");
        system.write_config("retry:\n  max_attempts: 2\n  initial_delay_ms: 0\n");
        system.publish_mom();
        system
    }

    /// Replace the configuration file
    pub fn write_config(&self, yaml: &str) {
        fs::write(&self.config, yaml).expect("Failed to write config");
    }

    /// Publish a bundle in the mirror with `includes` and regular `files`
    ///
    /// Parent directories of each file are listed as directory entries, like a real
    /// bundle manifest does.
    pub fn publish(&mut self, name: &str, includes: &[&str], files: &[(&str, &str)]) {
        let source = DirSource::new(&self.content);
        let mut manifest = Manifest::new(name, self.version);
        manifest.includes = includes.iter().map(|s| (*s).to_string()).collect();

        for (path, content) in files {
            for dir in parent_dirs(path) {
                if manifest.find_file(&dir).is_none() {
                    manifest.files.push(File::directory(dir, self.version));
                }
            }
            let hash = hash_bytes(content.as_bytes());
            let blob = source.blob_path(self.version, &hash);
            fs::create_dir_all(blob.parent().expect("blob has a parent"))
                .expect("Failed to create files dir");
            fs::write(&blob, content).expect("Failed to write blob");
            manifest
                .files
                .push(File::new(*path, self.version, hash));
        }

        let rendered = render_manifest(&manifest);
        write(&source.manifest_path(self.version, name), &rendered);

        self.mom.files.retain(|f| f.filename != name);
        self.mom
            .files
            .push(File::bundle(name, self.version, hash_bytes(rendered.as_bytes())));
        self.publish_mom();
    }

    fn publish_mom(&self) {
        let source = DirSource::new(&self.content);
        write(
            &source.manifest_path(self.version, MOM_NAME),
            &render_manifest(&self.mom),
        );
    }

    /// Install a published bundle by hand: write its files and its tracking marker
    pub fn preinstall(&self, name: &str) {
        let source = DirSource::new(&self.content);
        let text = fs::read_to_string(source.manifest_path(self.version, name))
            .expect("Failed to read published manifest");
        let manifest = swup::manifest::parse_manifest(name, &text).expect("Invalid manifest");

        for file in &manifest.files {
            let path = self.path(&file.filename);
            if file.kind == swup::manifest::FileKind::Directory {
                fs::create_dir_all(&path).expect("Failed to create directory");
            } else {
                let blob = source.blob_path(file.last_change, &file.hash);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).expect("Failed to create parent directory");
                }
                fs::copy(blob, &path).expect("Failed to copy blob");
            }
        }
        self.track(name);
    }

    /// Write a tracking marker
    pub fn track(&self, name: &str) {
        fs::write(self.bundles_dir().join(name), "").expect("Failed to write marker");
    }

    /// Tracked bundle names, sorted
    pub fn tracked(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.bundles_dir())
            .expect("Failed to read bundles dir")
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Marker directory on the managed system
    pub fn bundles_dir(&self) -> PathBuf {
        self.root.join("usr/share/clear/bundles")
    }

    /// Location of an absolute system path under the root
    pub fn path(&self, filename: &str) -> PathBuf {
        self.root.join(filename.trim_start_matches('/'))
    }

    /// Write a file on the managed system
    pub fn write_file(&self, filename: &str, content: &str) {
        write(&self.path(filename), content);
    }

    /// Read a file from the managed system
    pub fn read_file(&self, filename: &str) -> String {
        fs::read_to_string(self.path(filename)).expect("Failed to read file")
    }

    /// Check if a path exists on the managed system
    pub fn file_exists(&self, filename: &str) -> bool {
        self.path(filename).exists()
    }

    /// swup command pointed at this system, isolated from the caller's environment
    pub fn swup(&self) -> Command {
        let mut cmd = swup_cmd();
        cmd.env_remove("SWUP_CONFIG")
            .env_remove("SWUP_PATH_PREFIX")
            .env_remove("SWUP_STATE_DIR")
            .env_remove("SWUP_CONTENT_DIR")
            .env_remove("SWUP_LOG")
            .arg("--config")
            .arg(&self.config)
            .arg("--path")
            .arg(&self.root)
            .arg("--statedir")
            .arg(&self.state)
            .arg("--content")
            .arg(&self.content);
        cmd
    }
}

/// The swup binary
// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated, dead_code)]
pub fn swup_cmd() -> Command {
    Command::cargo_bin("swup").expect("swup binary is built")
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
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
