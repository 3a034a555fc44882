// crates/bagdb-core/src/dataset.rs

//! Opening the source read-only and recreating the target from scratch.

use crate::error::{BagError, Result};
use rusqlite::{Connection, OpenFlags};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const SIDECARS: [&str; 2] = ["-wal", "-shm"];

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut os = OsString::from(path.as_os_str());
    os.push(suffix);
    PathBuf::from(os)
}

/// Opens a dataset without write access.
pub fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(BagError::NotFound(format!(
            "Dataset not found at {}",
            path.display()
        )));
    }
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(Connection::open_with_flags(path, flags)?)
}

/// Deletes `target` (and its WAL sidecars) and opens a fresh database there.
///
/// Refuses to touch `source`.
pub fn recreate_target(source: &Path, target: &Path) -> Result<Connection> {
    if let (Ok(a), Ok(b)) = (source.canonicalize(), target.canonicalize()) {
        if a == b {
            return Err(BagError::SamePath(target.display().to_string()));
        }
    }

    if target.exists() {
        info!(target = %target.display(), "removing existing target");
        fs::remove_file(target)?;
    }
    for suffix in SIDECARS {
        let path = sidecar(target, suffix);
        if path.exists() {
            fs::remove_file(&path)?;
        }
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(Connection::open(target)?)
}
