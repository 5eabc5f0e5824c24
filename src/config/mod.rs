//! Updater configuration
//!
//! Configuration is layered: built-in defaults, then a YAML file, then `SWUP_*`
//! environment variables, then command line flags (applied by the CLI layer through
//! [`Overrides`]).
//!
//! ```yaml
//! path_prefix: /
//! state_dir: /var/lib/swup
//! content_dir: /var/lib/swup/content
//! retry:
//!   max_attempts: 3
//!   initial_delay_ms: 1000
//! protected_bundles: [os-core]
//! post_install_scripts:
//!   - systemctl daemon-reload
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{self, Result};
use crate::source::RetryPolicy;

/// System-wide configuration file, read when present
pub const SYSTEM_CONFIG_PATH: &str = "/etc/swup/config.yaml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "SWUP_CONFIG";

const PATH_PREFIX_ENV: &str = "SWUP_PATH_PREFIX";
const STATE_DIR_ENV: &str = "SWUP_STATE_DIR";
const CONTENT_DIR_ENV: &str = "SWUP_CONTENT_DIR";

/// Updater configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the system being managed
    pub path_prefix: PathBuf,

    /// Updater state: lock file, staged content, downloads
    pub state_dir: PathBuf,

    /// Local content mirror holding manifests and file blobs by version
    pub content_dir: PathBuf,

    /// Tracking marker directory, relative to `path_prefix`
    pub bundles_dir: PathBuf,

    /// Manifest fetch retry policy
    pub retry: RetryPolicy,

    /// Path prefixes the installer never writes to
    pub ignored_paths: Vec<String>,

    /// Shell commands run after a successful install
    pub post_install_scripts: Vec<String>,

    /// Bundles that can never be removed
    pub protected_bundles: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_prefix: PathBuf::from("/"),
            state_dir: PathBuf::from("/var/lib/swup"),
            content_dir: PathBuf::from("/var/lib/swup/content"),
            bundles_dir: PathBuf::from("usr/share/clear/bundles"),
            retry: RetryPolicy::default(),
            ignored_paths: [
                "/dev", "/home", "/lost+found", "/proc", "/root", "/run", "/sys", "/tmp", "/var",
            ]
            .iter()
            .map(|p| (*p).to_string())
            .collect(),
            post_install_scripts: Vec::new(),
            protected_bundles: vec!["os-core".to_string()],
        }
    }
}

/// Command line overrides, applied last
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub path_prefix: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub content_dir: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `explicit`, `$SWUP_CONFIG` or the system path
    ///
    /// An explicitly named file must exist; the system file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match named {
            Some(path) => {
                if !path.exists() {
                    return Err(error::config::not_found(path.display().to_string()));
                }
                Self::from_file(&path)?
            }
            None => {
                let system = Path::new(SYSTEM_CONFIG_PATH);
                if system.exists() {
                    Self::from_file(system)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading configuration");
        let content =
            std::fs::read_to_string(path).map_err(|e| error::fs::read_failed(path, e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| error::config::parse_failed(path.display().to_string(), e.to_string()))
    }

    fn apply_env(&mut self) {
        if let Some(prefix) = std::env::var_os(PATH_PREFIX_ENV) {
            self.path_prefix = PathBuf::from(prefix);
        }
        if let Some(state) = std::env::var_os(STATE_DIR_ENV) {
            self.state_dir = PathBuf::from(state);
        }
        if let Some(content) = std::env::var_os(CONTENT_DIR_ENV) {
            self.content_dir = PathBuf::from(content);
        }
    }

    /// Apply command line overrides
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(prefix) = overrides.path_prefix {
            self.path_prefix = prefix;
        }
        if let Some(state) = overrides.state_dir {
            self.state_dir = state;
        }
        if let Some(content) = overrides.content_dir {
            self.content_dir = content;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(error::config::invalid("retry.max_attempts must be at least 1"));
        }
        if self.bundles_dir.is_absolute() {
            return Err(error::config::invalid(
                "bundles_dir must be relative to path_prefix",
            ));
        }
        Ok(())
    }

    /// Directory holding one tracking marker per installed bundle
    pub fn bundles_dir(&self) -> PathBuf {
        self.path_prefix.join(&self.bundles_dir)
    }

    /// File the current OS version is read from
    pub fn os_release_path(&self) -> PathBuf {
        self.path_prefix.join("usr/lib/os-release")
    }

    /// Content-addressed staging area
    pub fn staged_dir(&self) -> PathBuf {
        self.state_dir.join("staged")
    }

    /// Process-wide lock file
    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("swup.lock")
    }

    /// Location of a manifest filename on the managed system
    pub fn target_path(&self, filename: &str) -> PathBuf {
        self.path_prefix.join(filename.trim_start_matches('/'))
    }

    /// Whether the installer must leave `filename` alone
    pub fn is_ignored(&self, filename: &str) -> bool {
        self.ignored_paths.iter().any(|prefix| {
            filename == prefix
                || filename
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Whether `bundle` may never be removed
    pub fn is_protected(&self, bundle: &str) -> bool {
        self.protected_bundles.iter().any(|b| b == bundle)
    }

    /// Configuration rooted in a scratch directory, used by tests
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            path_prefix: root.join("root"),
            state_dir: root.join("state"),
            content_dir: root.join("content"),
            retry: RetryPolicy::immediate(3),
            ..Self::default()
        }
    }
}
