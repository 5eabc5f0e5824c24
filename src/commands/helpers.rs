//! Command helper utilities

use std::path::Path;

use crate::config::{Config, Overrides};
use crate::error::Result;
use crate::source::DirSource;

/// Load configuration and apply command line directory flags on top
pub fn load_config(explicit: Option<&Path>, overrides: Overrides) -> Result<Config> {
    let mut config = Config::load(explicit)?;
    config.apply_overrides(overrides);
    Ok(config)
}

/// Content source for `config`
pub fn content_source(config: &Config) -> DirSource {
    DirSource::new(&config.content_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_flags_override_config_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.yaml");
        std::fs::write(&file, "path_prefix: /from/file\nstate_dir: /state/file\n").unwrap();

        let overrides = Overrides {
            path_prefix: Some(PathBuf::from("/from/flag")),
            ..Overrides::default()
        };
        let config = load_config(Some(&file), overrides).unwrap();
        assert_eq!(config.path_prefix, PathBuf::from("/from/flag"));
        assert_eq!(config.state_dir, PathBuf::from("/state/file"));
    }

    #[test]
    fn test_content_source_uses_content_dir() {
        let config = Config::rooted_at(Path::new("/tmp/swup"));
        assert_eq!(content_source(&config).root(), Path::new("/tmp/swup/content"));
    }
}
