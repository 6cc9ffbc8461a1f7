//! Filesystem helpers for generated output.
//!
//! - `write_file` - write a file, creating parent directories
//! - `remove_dir_if_exists` - delete a directory tree if present

use std::fs;
use std::io;
use std::path::Path;

/// Write `contents` to `path`, creating missing parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Remove a directory tree. Returns `false` if it did not exist.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}
