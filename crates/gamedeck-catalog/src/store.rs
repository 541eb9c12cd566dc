//! Key-value backends for the persisted tier
//!
//! The persisted tier only needs string slots addressed by a namespaced key,
//! the same contract as browser local storage. [`FileStore`] keeps one file
//! per slot and survives process restarts; [`MemoryStore`] lives for the
//! process and backs ephemeral sessions and tests.

use crate::error::CatalogResult;
use async_trait::async_trait;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// String slot storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns None if the slot does not exist.
    async fn get(&self, key: &str) -> CatalogResult<Option<String>>;

    /// Overwrites the slot wholesale.
    async fn set(&self, key: &str, value: &str) -> CatalogResult<()>;

    /// Returns true if the slot existed.
    async fn remove(&self, key: &str) -> CatalogResult<bool>;
}

/// Ensure a directory exists, creating it if necessary
pub(crate) async fn ensure_dir(path: impl AsRef<Path>) -> CatalogResult<()> {
    let path = path.as_ref();
    if tokio::fs::metadata(path).await.is_err() {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}

/// One JSON file per slot under a base directory
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed
    pub async fn open(base_dir: impl AsRef<Path>) -> CatalogResult<Self> {
        let base_dir = base_dir.as_ref();
        ensure_dir(base_dir).await?;
        debug!("Initialized file store at: {base_dir:?}");
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File backing a slot; separators in the key are flattened
    pub fn slot_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                c => c,
            })
            .collect();
        self.base_dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> CatalogResult<Option<String>> {
        let path = self.slot_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> CatalogResult<()> {
        let path = self.slot_path(key);
        let temp_path = path.with_extension("json.tmp");

        trace!("Writing {} bytes to slot {key}", value.len());

        let write_result = async {
            tokio::fs::write(&temp_path, value).await?;
            tokio::fs::rename(&temp_path, &path).await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        if write_result.is_err() {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }

        write_result?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> CatalogResult<bool> {
        match tokio::fs::remove_file(self.slot_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local slot storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> CatalogResult<Option<String>> {
        Ok(self.slots.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> CatalogResult<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> CatalogResult<bool> {
        Ok(self.slots.remove(key).is_some())
    }
}
