//! Configuration Management for TechNotes Core.
//!
//! - [`types`]: the configuration schema ([`CoreConfig`], [`LoggingConfig`],
//!   [`PreferencesConfig`], [`BufferPolicy`]).
//! - [`defaults`]: default values used by `serde` when fields are missing.
//! - [`loader`]: [`ConfigLoader`], which reads `config.toml` and validates it.
//!
//! A missing configuration file is not an error; defaults are used instead.

pub mod defaults;
pub mod types;
pub mod loader;

pub use types::{BufferPolicy, CoreConfig, LoggingConfig, PreferencesConfig};
pub use loader::ConfigLoader;
