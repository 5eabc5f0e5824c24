//! Post-install completion scripts
//!
//! Scripts run after files are committed. They are not part of the transaction: a failing
//! script is logged and the install still succeeds.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

/// Runs whatever must happen after new files land on the system
pub trait ScriptRunner {
    /// Run all scripts; returns how many failed
    fn run_scripts(&self) -> usize;
}

/// Shell commands from configuration, each run with `sh -c`
///
/// Commands see the managed root in `SWUP_PATH_PREFIX`.
#[derive(Debug, Clone)]
pub struct CommandScripts {
    commands: Vec<String>,
    path_prefix: PathBuf,
}

impl CommandScripts {
    pub fn new(commands: Vec<String>, path_prefix: impl Into<PathBuf>) -> Self {
        Self {
            commands,
            path_prefix: path_prefix.into(),
        }
    }
}

impl ScriptRunner for CommandScripts {
    fn run_scripts(&self) -> usize {
        let mut failures = 0;
        for command in &self.commands {
            debug!(command = %command, "running post-install script");
            let status = Command::new("sh")
                .arg("-c")
                .arg(command)
                .env("SWUP_PATH_PREFIX", &self.path_prefix)
                .status();

            match status {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    warn!(command = %command, %status, "post-install script failed");
                    failures += 1;
                }
                Err(e) => {
                    warn!(command = %command, error = %e, "post-install script could not start");
                    failures += 1;
                }
            }
        }
        failures
    }
}
