//! # Offline Cache Module
//!
//! Whole audio payloads stored in the host object store, keyed by track id.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     OfflineCacheManager                │
//! │  - download()                          │
//! │  - remove()                            │
//! │  - is_offline()                        │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> OfflineCache (ObjectStore)
//!          ├──> HttpClient (payload fetch)
//!          └──> EventBus (CacheEvent)
//! ```
//!
//! A track is offline exactly when its id is a key in the store. Entries never
//! expire and payloads are not verified.

pub mod manager;

pub use manager::{DownloadOutcome, OfflineCacheManager};

use crate::error::{PlaybackError, Result};
use bridge_traits::ObjectStore;
use bytes::Bytes;
use core_library::TrackId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Typed view of the object store holding offline payloads.
#[derive(Clone)]
pub struct OfflineCache {
    store: Arc<dyn ObjectStore>,
}

impl OfflineCache {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn put(&self, track_id: &TrackId, payload: Bytes) -> Result<()> {
        let len = payload.len();
        self.store
            .put(track_id.as_str(), payload)
            .await
            .map_err(|e| cache_error("store", track_id, e))?;
        debug!(track_id = %track_id, bytes = len, "Payload stored");
        Ok(())
    }

    pub async fn get(&self, track_id: &TrackId) -> Result<Option<Bytes>> {
        self.store
            .get(track_id.as_str())
            .await
            .map_err(|e| cache_error("read", track_id, e))
    }

    pub async fn delete(&self, track_id: &TrackId) -> Result<()> {
        self.store
            .delete(track_id.as_str())
            .await
            .map_err(|e| cache_error("delete", track_id, e))
    }

    pub async fn contains(&self, track_id: &TrackId) -> Result<bool> {
        self.store
            .contains(track_id.as_str())
            .await
            .map_err(|e| cache_error("lookup", track_id, e))
    }

    /// Every id currently held in the store.
    pub async fn list_keys(&self) -> Result<BTreeSet<TrackId>> {
        let keys = self
            .store
            .list_keys()
            .await
            .map_err(|e| PlaybackError::CacheError(format!("Failed to list offline tracks: {}", e)))?;
        Ok(keys.into_iter().map(TrackId::from).collect())
    }
}

fn cache_error(operation: &str, track_id: &TrackId, err: bridge_traits::BridgeError) -> PlaybackError {
    PlaybackError::CacheError(format!(
        "Failed to {} offline payload for {}: {}",
        operation, track_id, err
    ))
}
