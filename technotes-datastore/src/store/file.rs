//! Preferences persisted as a single JSON document.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use technotes_core::CoreError;

use super::KeyValueStore;
use crate::error::StoreError;
use crate::value::StoredValue;

type Entries = BTreeMap<String, StoredValue>;

/// File-backed store.
///
/// The whole map is kept in memory and the file is rewritten on every mutation
/// through a temporary sibling file and a rename, so a crash never leaves a
/// half-written document behind. The in-memory map only changes after the file
/// was written successfully.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store. A file that is not a valid document
    /// is reported as `StoreError::Encoding` rather than silently discarded.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            technotes_core::ensure_dir_exists(parent).map_err(core_to_store_error)?;
        }

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Entries::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                warn!(path = %path.display(), error = %e, "Preferences file is corrupt");
                StoreError::Encoding(e)
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Preferences file not found, starting empty");
                Entries::new()
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened preferences file");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &Entries) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Applies `mutate` to a copy of the map, persists it, then commits it.
    async fn mutate<R>(&self, mutate: impl FnOnce(&mut Entries) -> R) -> Result<R, StoreError> {
        let mut guard = self.entries.lock().await;
        let mut updated = guard.clone();
        let result = mutate(&mut updated);
        self.persist(&updated).await?;
        *guard = updated;
        Ok(result)
    }
}

fn core_to_store_error(err: CoreError) -> StoreError {
    match err {
        CoreError::Filesystem { source, .. } => StoreError::Io(source),
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        if !self.entries.lock().await.contains_key(key) {
            return Ok(false);
        }
        self.mutate(|entries| entries.remove(key).is_some()).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.mutate(|entries| entries.clear()).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }
}
