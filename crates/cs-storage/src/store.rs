//! Blob store backends.
//!
//! The core only needs whole-object reads and writes by key. Keys are opaque
//! strings; no listing, versioning or conditional writes are used.

use crate::{Result, StorageError};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Whole-object key/value blob storage.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch the object stored under `key`.
    ///
    /// Fails with [`StorageError::BlobNotFound`] if there is none.
    fn get(&self, key: &str) -> Result<Vec<u8>>;
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        (**self).put(key, bytes)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        (**self).get(key)
    }
}

/// Bucket directory on a local or mounted filesystem.
///
/// Each key is a file directly under the root. Writes go to a temporary file
/// that is renamed into place, so readers never see a partial object.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.contains(['/', '\\'])
            || key == "."
            || key == ".."
            || key.starts_with(".tmp-")
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;

        let tmp_path = self
            .root
            .join(format!(".tmp-{}-{}", uuid::Uuid::new_v4().simple(), key));
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        if let Err(e) = std::fs::rename(&tmp_path, &path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %path.display(), bytes = bytes.len(), "Blob stored");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "Blob fetched");
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::BlobNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().remove(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.lock()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::BlobNotFound(key.to_string()))
    }
}
