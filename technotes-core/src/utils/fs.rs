//! Filesystem Utilities.
//!
//! Helpers for common filesystem operations that report failures as
//! [`CoreError::Filesystem`] with the offending path attached.

use crate::error::CoreError;
use std::fs;
use std::path::Path;

/// Ensures that a directory exists at the given path, creating it and any
/// missing parents if necessary.
///
/// # Errors
///
/// Returns `CoreError::Filesystem` if the path exists but is not a directory,
/// or if directory creation fails.
///
/// ```no_run
/// # use technotes_core::utils::fs::ensure_dir_exists;
/// let temp_dir = tempfile::tempdir().unwrap();
/// let dir_path = temp_dir.path().join("prefs");
/// ensure_dir_exists(&dir_path).unwrap();
/// assert!(dir_path.is_dir());
/// ```
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if !path.is_dir() {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "Path exists but is not a directory",
                ),
            })
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads the entire contents of a file into a string.
///
/// A missing file is reported as `CoreError::Filesystem` whose source has
/// `ErrorKind::NotFound`; see [`CoreError::is_not_found`].
pub fn read_file_to_string(path: &Path) -> Result<String, CoreError> {
    fs::read_to_string(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to read file".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}
