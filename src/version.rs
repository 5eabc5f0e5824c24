//! Current OS version detection

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SwupError};

const VERSION_KEY: &str = "VERSION_ID";

/// Read the numeric `VERSION_ID` from an os-release file
pub fn current_version(os_release: &Path) -> Result<u32> {
    let unavailable = |reason: String| SwupError::VersionUnavailable {
        path: os_release.display().to_string(),
        reason,
    };

    let content = fs::read_to_string(os_release).map_err(|e| unavailable(e.to_string()))?;
    let version = parse_version_id(&content).ok_or_else(|| {
        unavailable(format!("no numeric {VERSION_KEY} entry"))
    })?;

    debug!(version, "current OS version");
    Ok(version)
}

fn parse_version_id(content: &str) -> Option<u32> {
    content.lines().find_map(|line| {
        let (key, value) = line.trim().split_once('=')?;
        if key != VERSION_KEY {
            return None;
        }
        value.trim().trim_matches('"').parse().ok()
    })
}
