//! Process-wide update lock
//!
//! Every operation takes an exclusive advisory lock on `<state_dir>/swup.lock` before
//! touching anything, and holds it until the [`ProcessLock`] guard drops. The holder
//! writes a JSON record of its PID and command into the lock file so that a contending
//! process can say who is in the way.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SwupError};

/// Contents of a held lock file
#[derive(Debug, Serialize, Deserialize)]
pub struct LockMetadata {
    pub pid: u32,
    pub started_at_unix: u64,
    pub command: String,
}

/// Exclusive lock guard; released on drop
#[derive(Debug)]
pub struct ProcessLock {
    file: File,
    path: PathBuf,
}

impl ProcessLock {
    /// Take the lock at `path` for `command`, failing fast if another process holds it
    pub fn acquire(path: &Path, command: &str) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| lock_failed(path, &e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| lock_failed(path, &e))?;

        if let Err(err) = try_lock(&file) {
            if err.kind() == io::ErrorKind::WouldBlock {
                return Err(contention_error(path));
            }
            return Err(lock_failed(path, &err));
        }

        write_metadata(&file, command).map_err(|e| lock_failed(path, &e))?;
        debug!(path = %path.display(), command, "lock acquired");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Metadata as written by this holder
    pub fn read_metadata(&self) -> io::Result<LockMetadata> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        serde_json::from_str(&contents).map_err(io::Error::other)
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "lock released");
    }
}

fn write_metadata(file: &File, command: &str) -> io::Result<()> {
    let metadata = LockMetadata {
        pid: std::process::id(),
        started_at_unix: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        command: command.to_string(),
    };

    file.set_len(0)?;
    let mut writer = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &metadata).map_err(io::Error::other)?;
    writer.flush()
}

fn contention_error(path: &Path) -> SwupError {
    let metadata = std::fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<LockMetadata>(&contents).ok());

    match metadata {
        Some(metadata) => SwupError::LockHeld {
            command: metadata.command,
            pid: metadata.pid,
            lock_path: path.display().to_string(),
        },
        None => SwupError::LockFailed {
            path: path.display().to_string(),
            reason: "held by another process".to_string(),
        },
    }
}

fn lock_failed(path: &Path, err: &io::Error) -> SwupError {
    SwupError::LockFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> io::Result<()> {
    use rustix::fs::{FlockOperation, flock};

    flock(file, FlockOperation::NonBlockingLockExclusive)
        .map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "advisory locking requires a unix host",
    ))
}
