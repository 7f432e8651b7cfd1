//! Platform-specific application directories, resolved with `directories-next`.
//!
//! On Linux these follow the XDG base directory layout, e.g.
//! `~/.config/technotes` for configuration and `~/.local/share/technotes` for data.

use std::path::{Path, PathBuf};
use directories_next::ProjectDirs;
use crate::error::{CoreError, ConfigError};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "TechNotes";
const APPLICATION: &str = "technotes";

fn project_dirs(dir_type: &str) -> Result<ProjectDirs, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
        CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: dir_type.to_string(),
        })
    })
}

/// Returns the application-specific configuration directory.
///
/// # Errors
/// Returns [`ConfigError::DirectoryUnavailable`] (wrapped in `CoreError::Config`)
/// if no home directory can be determined.
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Config").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the application-specific data directory. Persisted preferences live here.
pub fn get_app_data_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Data").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Returns the application-specific state directory (log files).
///
/// `ProjectDirs` has no dedicated state directory, so this is `state/` below the
/// local data directory.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App State").map(|dirs| dirs.data_local_dir().join("state"))
}

/// Resolves `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
