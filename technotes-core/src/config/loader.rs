//! Configuration Loading for TechNotes Core.
//!
//! [`ConfigLoader`] locates `config.toml`, deserializes it, falls back to
//! defaults when the file does not exist, and validates the result.
//!
//! ```rust,ignore
//! use technotes_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("Cache size: {}", config.preferences.cache_size),
//!     Err(e) => {
//!         technotes_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration loading failed: {}", e);
//!     }
//! }
//! ```

use std::path::Path;
use tracing::debug;

use crate::config::{BufferPolicy, CoreConfig};
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as tn_fs;
use crate::utils::paths::{get_app_config_dir, get_app_data_dir, get_app_state_dir, resolve_against};

const CONFIG_FILE_NAME: &str = "config.toml";
const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 2] = ["text", "json"];

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `config.toml` from the application config directory.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let path = get_app_config_dir()?.join(CONFIG_FILE_NAME);
        Self::load_from_path(&path)
    }

    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ReadError` if the file exists but cannot be read.
    /// - `ConfigError::ParseError` for malformed TOML or unknown fields.
    /// - `ConfigError::ValidationError` for out-of-range values.
    pub fn load_from_path(path: &Path) -> Result<CoreConfig, CoreError> {
        let config = match tn_fs::read_file_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "Parsing configuration file");
                Self::parse(&content)?
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Configuration file not found, using defaults");
                CoreConfig::default()
            }
            Err(CoreError::Filesystem { path, source, .. }) => {
                return Err(ConfigError::ReadError { path, source }.into());
            }
            Err(e) => return Err(e),
        };
        Self::validate_config(config)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn load_from_str(content: &str) -> Result<CoreConfig, CoreError> {
        Self::validate_config(Self::parse(content)?)
    }

    fn parse(content: &str) -> Result<CoreConfig, CoreError> {
        if content.trim().is_empty() {
            return Ok(CoreConfig::default());
        }
        toml::from_str(content).map_err(|e| CoreError::Config(ConfigError::ParseError(e)))
    }

    /// Normalizes and validates a configuration.
    ///
    /// Log level and format are lowercased. Relative log file paths are resolved
    /// against the state directory, relative storage files against the data directory.
    pub fn validate_config(mut config: CoreConfig) -> Result<CoreConfig, CoreError> {
        let level = config.logging.level.to_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            return Err(invalid(format!(
                "Invalid log level '{}'. Must be one of: {}",
                config.logging.level,
                VALID_LEVELS.join(", ")
            )));
        }
        config.logging.level = level;

        let format = config.logging.format.to_lowercase();
        if !VALID_FORMATS.contains(&format.as_str()) {
            return Err(invalid(format!(
                "Invalid log format '{}'. Must be one of: {}",
                config.logging.format,
                VALID_FORMATS.join(", ")
            )));
        }
        config.logging.format = format;

        if let Some(file_path) = config.logging.file_path.take() {
            if file_path.as_os_str().is_empty() {
                return Err(invalid("Log file path must not be empty".to_string()));
            }
            config.logging.file_path = Some(if file_path.is_absolute() {
                file_path
            } else {
                resolve_against(&get_app_state_dir()?, &file_path)
            });
        }

        let prefs = &mut config.preferences;
        if prefs.cache_size == 0 {
            return Err(invalid("preferences.cache_size must be greater than zero".to_string()));
        }
        if prefs.max_key_length == 0 {
            return Err(invalid("preferences.max_key_length must be greater than zero".to_string()));
        }
        if prefs.max_string_length == 0 {
            return Err(invalid("preferences.max_string_length must be greater than zero".to_string()));
        }
        if let BufferPolicy::DropOldest { capacity: 0 } = prefs.notification_buffer {
            return Err(invalid(
                "preferences.notification_buffer capacity must be greater than zero".to_string(),
            ));
        }
        if let Some(storage_file) = prefs.storage_file.take() {
            if storage_file.as_os_str().is_empty() {
                return Err(invalid("preferences.storage_file must not be empty".to_string()));
            }
            prefs.storage_file = Some(if storage_file.is_absolute() {
                storage_file
            } else {
                resolve_against(&get_app_data_dir()?, &storage_file)
            });
        }

        Ok(config)
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::Config(ConfigError::ValidationError(message))
}
