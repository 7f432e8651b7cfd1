//! General utilities for TechNotes Core.
//!
//! - [`fs`]: filesystem helpers (ensuring directories exist, reading files).
//! - [`paths`]: platform-specific application directories.

pub mod fs;
pub mod paths;

pub use fs::{ensure_dir_exists, read_file_to_string};
