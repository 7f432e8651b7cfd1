use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::PreferenceValue;

/// Key reported by [`ChangeEvent::StoreCleared`].
pub const ALL_KEYS: &str = "*";

/// One mutation of the preference store. Broadcast to subscribers, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    ValueAdded {
        key: String,
        value: PreferenceValue,
        timestamp: DateTime<Utc>,
    },
    ValueUpdated {
        key: String,
        old_value: PreferenceValue,
        new_value: PreferenceValue,
        timestamp: DateTime<Utc>,
    },
    ValueRemoved {
        key: String,
        old_value: PreferenceValue,
        timestamp: DateTime<Utc>,
    },
    StoreCleared {
        timestamp: DateTime<Utc>,
    },
}

impl ChangeEvent {
    pub fn added(key: impl Into<String>, value: PreferenceValue) -> Self {
        ChangeEvent::ValueAdded {
            key: key.into(),
            value,
            timestamp: Utc::now(),
        }
    }

    pub fn updated(key: impl Into<String>, old_value: PreferenceValue, new_value: PreferenceValue) -> Self {
        ChangeEvent::ValueUpdated {
            key: key.into(),
            old_value,
            new_value,
            timestamp: Utc::now(),
        }
    }

    pub fn removed(key: impl Into<String>, old_value: PreferenceValue) -> Self {
        ChangeEvent::ValueRemoved {
            key: key.into(),
            old_value,
            timestamp: Utc::now(),
        }
    }

    pub fn cleared() -> Self {
        ChangeEvent::StoreCleared { timestamp: Utc::now() }
    }

    /// The affected key, or [`ALL_KEYS`] for a store-wide clear.
    pub fn key(&self) -> &str {
        match self {
            ChangeEvent::ValueAdded { key, .. }
            | ChangeEvent::ValueUpdated { key, .. }
            | ChangeEvent::ValueRemoved { key, .. } => key,
            ChangeEvent::StoreCleared { .. } => ALL_KEYS,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ChangeEvent::ValueAdded { timestamp, .. }
            | ChangeEvent::ValueUpdated { timestamp, .. }
            | ChangeEvent::ValueRemoved { timestamp, .. }
            | ChangeEvent::StoreCleared { timestamp } => *timestamp,
        }
    }

    pub fn is_store_cleared(&self) -> bool {
        matches!(self, ChangeEvent::StoreCleared { .. })
    }

    /// Whether an observer of `key` must see this event. Clears concern every key.
    pub fn concerns(&self, key: &str) -> bool {
        self.is_store_cleared() || self.key() == key
    }
}
