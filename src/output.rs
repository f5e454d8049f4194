//! File-write collaborator.
//!
//! A unit's output is committed only after its full render+splice pass
//! succeeded, and the commit itself is atomic: tempfile in the target
//! directory, fsync, rename. An aborted pass leaves the file exactly as
//! it was.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("cannot write {0}: path has no parent directory")]
    NoParent(PathBuf),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Atomically replace `path` with `content`.
pub fn atomic_write(path: &Path, content: &str) -> Result<(), OutputError> {
    let parent = path
        .parent()
        .ok_or_else(|| OutputError::NoParent(path.to_path_buf()))?;

    // Tempfile in the same directory keeps the rename on one filesystem.
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    // Bump mtime so incremental builds pick up the regenerated unit.
    filetime::set_file_mtime(path, filetime::FileTime::now())?;

    Ok(())
}

/// Write `content` to `path` unless the file already holds exactly that
/// text. Returns true when a write happened.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool, OutputError> {
    match fs::read_to_string(path) {
        Ok(existing) if existing == content => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    atomic_write(path, content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.rs");
        fs::write(&path, "before").unwrap();

        atomic_write(&path, "after").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "after");
    }

    #[test]
    fn write_if_changed_skips_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.rs");
        fs::write(&path, "same").unwrap();

        assert!(!write_if_changed(&path, "same").unwrap());
        assert!(write_if_changed(&path, "different").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "different");
    }

    #[test]
    fn write_if_changed_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.rs");

        assert!(write_if_changed(&path, "fn f() {}").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn f() {}");
    }
}
