use std::io;
use thiserror::Error;

use crate::value::PreferenceKind;

/// Rejection of a malformed key or value. Raised before any mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Preference key must not be blank")]
    BlankKey,

    #[error("Preference key is {length} characters long, maximum is {max}")]
    KeyTooLong { length: usize, max: usize },

    #[error("Preference key '{key}' contains a null character")]
    KeyContainsNul { key: String },

    #[error("Value for preference '{key}' must not be null")]
    NullValue { key: String },

    #[error("String value for preference '{key}' is {length} characters long, maximum is {max}")]
    StringTooLong { key: String, length: usize, max: usize },

    /// NaN and infinities have no stored representation.
    #[error("Numeric value for preference '{key}' must be finite")]
    NonFiniteNumber { key: String },
}

/// Failures reported by an underlying key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Stored value for '{key}' has kind {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: PreferenceKind,
        found: PreferenceKind,
    },

    #[error("Store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Error type of the preferences datastore and repository.
#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error during '{operation}' of '{key}': {source}")]
    Storage {
        operation: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Serialization error for preference '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Deserialization error for preference '{key}': {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A store operation spawned onto the configured runtime did not complete.
    #[error("Failed to dispatch store operation: {0}")]
    Dispatch(String),
}

impl PreferencesError {
    pub fn storage(operation: &'static str, key: impl Into<String>, source: StoreError) -> Self {
        PreferencesError::Storage {
            operation,
            key: key.into(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PreferencesError::Validation(_))
    }
}

pub type Result<T, E = PreferencesError> = std::result::Result<T, E>;
