//! # TechNotes Core Library (`technotes-core`)
//!
//! Foundation shared by the TechNotes crates:
//!
//! - **Error Handling**: [`CoreError`] with the more specific [`ConfigError`] and [`LoggingError`].
//! - **Configuration**: TOML configuration ([`CoreConfig`]) loaded by [`ConfigLoader`], with
//!   defaults for every field, including the preferences datastore settings.
//! - **Logging**: `tracing`-based console and file logging.
//! - **Utilities**: filesystem helpers and platform application directories.
//!
//! ```rust,ignore
//! use technotes_core::config::ConfigLoader;
//! use technotes_core::logging::initialize_logging;
//! use technotes_core::error::CoreError;
//!
//! fn main() -> Result<(), CoreError> {
//!     let core_config = ConfigLoader::load()?;
//!     initialize_logging(&core_config.logging, false)?;
//!     tracing::info!("TechNotes core initialized.");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod config;
pub mod logging;
pub mod utils;

pub use error::{CoreError, ConfigError, LoggingError};
pub use config::{BufferPolicy, CoreConfig, LoggingConfig, PreferencesConfig, ConfigLoader};
pub use logging::{initialize_logging, init_minimal_logging};
pub use utils::{ensure_dir_exists, read_file_to_string};
