//! Configuration Data Structures for TechNotes Core.
//!
//! These structs are populated by deserializing a TOML configuration file.
//! Missing fields fall back to the functions in [`super::defaults`], and unknown
//! fields are rejected via `#[serde(deny_unknown_fields)]`.

use serde::Deserialize;
use std::path::PathBuf;
use super::defaults;

/// Configuration settings for the logging subsystem.
///
/// # Examples
///
/// ```
/// use technotes_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let default_log_config = LoggingConfig::default();
/// assert_eq!(default_log_config.level, "info");
/// assert_eq!(default_log_config.file_path, None);
/// assert_eq!(default_log_config.format, "text");
///
/// let toml_str = r#"
/// level = "debug"
/// file_path = "/var/log/technotes.log"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/technotes.log")));
/// assert_eq!(log_config.format, "json");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum log level: "trace", "debug", "info", "warn" or "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. `None` disables file logging.
    /// Relative paths are resolved against the application's state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json" (case-insensitive).
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_log_level(),
            file_path: defaults::default_log_file_path(),
            format: defaults::default_log_format(),
        }
    }
}

/// Buffering policy for change-notification subscribers.
///
/// `Unbounded` never drops an event but lets a stalled subscriber grow its queue
/// without limit. `DropOldest` caps every subscriber at `capacity` pending events;
/// a subscriber that falls further behind loses the oldest ones.
///
/// In TOML: `notification_buffer = { policy = "drop_oldest", capacity = 64 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BufferPolicy {
    Unbounded,
    DropOldest { capacity: usize },
}

impl Default for BufferPolicy {
    fn default() -> Self {
        BufferPolicy::Unbounded
    }
}

/// Settings for the reactive preferences datastore.
///
/// ```
/// use technotes_core::config::{BufferPolicy, PreferencesConfig};
///
/// let config = PreferencesConfig::default();
/// assert_eq!(config.cache_size, 200);
/// assert_eq!(config.max_key_length, 255);
/// assert_eq!(config.max_string_length, 10_000);
/// assert_eq!(config.notification_buffer, BufferPolicy::Unbounded);
/// assert_eq!(config.storage_file, None);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreferencesConfig {
    /// Maximum number of entries held by the in-memory LRU cache.
    #[serde(default = "defaults::default_cache_size")]
    pub cache_size: usize,
    /// Maximum key length, in characters.
    #[serde(default = "defaults::default_max_key_length")]
    pub max_key_length: usize,
    /// Maximum length of a string value, in characters.
    #[serde(default = "defaults::default_max_string_length")]
    pub max_string_length: usize,
    #[serde(default)]
    pub notification_buffer: BufferPolicy,
    /// Backing file for the JSON file store. `None` keeps preferences in memory only.
    /// Relative paths are resolved against the application's data directory.
    #[serde(default = "defaults::default_storage_file")]
    pub storage_file: Option<PathBuf>,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            cache_size: defaults::default_cache_size(),
            max_key_length: defaults::default_max_key_length(),
            max_string_length: defaults::default_max_string_length(),
            notification_buffer: BufferPolicy::default(),
            storage_file: defaults::default_storage_file(),
        }
    }
}

/// Root configuration structure.
///
/// ```
/// use technotes_core::config::CoreConfig;
///
/// let toml_str = r#"
/// [logging]
/// level = "warn"
///
/// [preferences]
/// cache_size = 50
/// "#;
/// let loaded_config: CoreConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(loaded_config.logging.level, "warn");
/// assert_eq!(loaded_config.logging.format, "text");
/// assert_eq!(loaded_config.preferences.cache_size, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_preferences_config")]
    pub preferences: PreferencesConfig,
}
