//! Write-to-temp-then-rename, so readers never see a half-written file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling temp path: `<dir>/.tmp_<name>`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".tmp_{}", name))
}

/// Produce the file at a temp path via `write`, then atomically move it over
/// `path`. The temp file is removed on any failure.
pub fn replace_with<E>(
    path: &Path,
    write: impl FnOnce(&Path) -> Result<(), E>,
) -> Result<(), AtomicError<E>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(AtomicError::Io)?;
    }

    let temp = temp_path_for(path);
    let result = write(&temp)
        .map_err(AtomicError::Write)
        .and_then(|()| fs::rename(&temp, path).map_err(AtomicError::Io));

    if result.is_err() && temp.exists() {
        if let Err(err) = fs::remove_file(&temp) {
            tracing::warn!(path = %temp.display(), %err, "could not remove temp file");
        }
    }
    result
}

/// Write bytes atomically.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> io::Result<()> {
    replace_with(path, |temp| fs::write(temp, bytes)).map_err(|e| match e {
        AtomicError::Io(err) | AtomicError::Write(err) => err,
    })
}

#[derive(Debug)]
pub enum AtomicError<E> {
    /// Directory creation or the final rename failed.
    Io(io::Error),
    /// The caller's writer failed.
    Write(E),
}
