//! Default configuration values for TechNotes Core.
//!
//! These functions are referenced by `serde`'s `default` attribute in the
//! configuration structures.

use crate::config::{LoggingConfig, PreferencesConfig};
use std::path::PathBuf;

/// Used by `CoreConfig` if the `logging` section is missing.
pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig::default()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None // No log file by default
}

pub(super) fn default_log_format() -> String {
    "text".to_string()
}

/// Used by `CoreConfig` if the `preferences` section is missing.
pub(super) fn default_preferences_config() -> PreferencesConfig {
    PreferencesConfig::default()
}

pub(super) fn default_cache_size() -> usize {
    200
}

pub(super) fn default_max_key_length() -> usize {
    255
}

pub(super) fn default_max_string_length() -> usize {
    10_000
}

pub(super) fn default_storage_file() -> Option<PathBuf> {
    None
}
