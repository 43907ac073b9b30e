//! Profile record storage
//!
//! The engine only needs "get by name" and "put by name". Two stores are
//! provided: an in-process map and a directory of JSON files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use crate::profile::{ProfileQuery, ProfileRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Key-value storage of merged records, keyed by the query name
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, key: &ProfileQuery) -> Result<Option<ProfileRecord>, StoreError>;

    async fn put(&self, key: &ProfileQuery, record: &ProfileRecord) -> Result<(), StoreError>;
}

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    records: Arc<DashMap<String, ProfileRecord>>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, key: &ProfileQuery) -> Result<Option<ProfileRecord>, StoreError> {
        Ok(self.records.get(key.as_str()).map(|r| r.value().clone()))
    }

    async fn put(&self, key: &ProfileQuery, record: &ProfileRecord) -> Result<(), StoreError> {
        self.records.insert(key.as_str().to_string(), record.clone());
        Ok(())
    }
}

/// One JSON file per name inside a directory
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    dir: PathBuf,
}

impl FileProfileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the user cache directory
    #[must_use]
    pub fn in_cache_dir() -> Self {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("profile_finder/profiles");
        Self::new(dir)
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a key
    ///
    /// Names are percent-encoded so that any name maps to exactly one safe
    /// file name.
    fn path_for(&self, key: &ProfileQuery) -> PathBuf {
        self.dir
            .join(format!("{}.json", urlencoding::encode(key.as_str())))
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn get(&self, key: &ProfileQuery) -> Result<Option<ProfileRecord>, StoreError> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!("Loaded stored profile from {}", path.display());
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn put(&self, key: &ProfileQuery, record: &ProfileRecord) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Stored profile at {}", path.display());
        Ok(())
    }
}
