//! Binary payload storage for native hosts.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::ObjectStore,
};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const EXTENSION: &str = "bin";

/// Longest key whose hex file name (plus the staging extension) fits the
/// 255-byte name limit of common filesystems.
pub const MAX_KEY_LEN: usize = 120;

/// One file per payload. File names are the hex encoding of the key, so any
/// identifier (including ones with `/` or `..`) maps to a safe, reversible name.
/// Keys longer than [`MAX_KEY_LEN`] bytes are refused on write and never found
/// on read.
pub struct FileObjectStore {
    root: PathBuf,
}

impl FileObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store payloads under `<cache dir>/musicpod/offline_tracks`.
    pub fn in_cache_dir() -> Self {
        let root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("musicpod")
            .join("offline_tracks");
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", hex::encode(key.as_bytes()), EXTENSION))
    }

    fn fits(key: &str) -> bool {
        key.len() <= MAX_KEY_LEN
    }

    fn key_from_path(path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let raw = hex::decode(stem).ok()?;
        String::from_utf8(raw).ok()
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        if !Self::fits(key) {
            return Err(BridgeError::OperationFailed(format!(
                "Object key is {} bytes, limit is {}",
                key.len(),
                MAX_KEY_LEN
            )));
        }
        fs::create_dir_all(&self.root).await?;

        // Write beside the target, then rename so readers never see a partial payload.
        let target = self.path_for(key);
        let staging = target.with_extension("part");
        let written = async {
            let mut file = fs::File::create(&staging).await?;
            file.write_all(&value).await?;
            file.flush().await?;
            drop(file);
            fs::rename(&staging, &target).await?;
            Ok::<_, std::io::Error>(())
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&staging).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(error = %cleanup, path = ?staging, "Failed to remove staging file");
                }
            }
            return Err(BridgeError::Io(e));
        }

        debug!(key, size = value.len(), path = ?target, "Stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        if !Self::fits(key) {
            return Ok(None);
        }
        match fs::read(self.path_for(key)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if !Self::fits(key) {
            return Ok(());
        }
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!(key, "Deleted object");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(key) = Self::key_from_path(&entry.path()) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        if !Self::fits(key) {
            return Ok(false);
        }
        Ok(fs::try_exists(self.path_for(key)).await?)
    }
}

/// Volatile store used by tests and headless sessions.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        self.objects.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.objects.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.write().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.objects.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
