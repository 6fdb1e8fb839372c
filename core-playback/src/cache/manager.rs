//! # Offline Cache Manager
//!
//! Downloads payloads for offline playback and answers "is this track
//! offline?" without touching storage.
//!
//! - One download per track at a time; a second request for a track that is
//!   already downloading returns [`DownloadOutcome::InProgress`].
//! - No retries and no timeouts. A failed download leaves the cache as it was
//!   and publishes [`CacheEvent::DownloadFailed`] with the user notice.

use crate::cache::OfflineCache;
use crate::error::{PlaybackError, Result};
use bridge_traits::HttpClient;
use bytes::Bytes;
use core_library::{Track, TrackId};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use core_runtime::logging::redact_url;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Result of a download request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded { bytes: u64 },
    /// Already offline; nothing fetched.
    AlreadyCached,
    /// Another download of the same track is running.
    InProgress,
}

/// Offline cache manager for downloading and removing cached tracks.
pub struct OfflineCacheManager {
    cache: OfflineCache,
    http_client: Arc<dyn HttpClient>,
    event_bus: EventBus,
    downloads_enabled: bool,
    known_offline: RwLock<BTreeSet<TrackId>>,
    in_flight: Mutex<HashSet<TrackId>>,
}

impl OfflineCacheManager {
    pub fn new(cache: OfflineCache, http_client: Arc<dyn HttpClient>, event_bus: EventBus) -> Self {
        Self {
            cache,
            http_client,
            event_bus,
            downloads_enabled: true,
            known_offline: RwLock::new(BTreeSet::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Allow or refuse new downloads. Existing entries stay readable either way.
    pub fn with_downloads_enabled(mut self, enabled: bool) -> Self {
        self.downloads_enabled = enabled;
        self
    }

    /// Rebuild the known-offline set from the store. Returns the entry count.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize> {
        let keys = self.cache.list_keys().await?;
        let count = keys.len();
        *self.known_offline.write() = keys;
        info!(count, "Offline tracks loaded");
        Ok(count)
    }

    pub fn is_offline(&self, track_id: &TrackId) -> bool {
        self.known_offline.read().contains(track_id)
    }

    pub fn is_downloading(&self, track_id: &TrackId) -> bool {
        self.in_flight.lock().contains(track_id)
    }

    pub fn offline_ids(&self) -> BTreeSet<TrackId> {
        self.known_offline.read().clone()
    }

    pub fn downloads_enabled(&self) -> bool {
        self.downloads_enabled
    }

    /// Cached payload for `track_id`, if any.
    pub async fn payload(&self, track_id: &TrackId) -> Result<Option<Bytes>> {
        self.cache.get(track_id).await
    }

    /// Fetch the network payload of `track` in full and store it.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn download(&self, track: &Track) -> Result<DownloadOutcome> {
        if !self.downloads_enabled {
            warn!("Download refused, offline cache disabled");
            return Err(PlaybackError::OfflineCacheDisabled);
        }

        if self.is_offline(&track.id) {
            debug!("Track already offline");
            return Ok(DownloadOutcome::AlreadyCached);
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &track.id) else {
            debug!("Download already running");
            return Ok(DownloadOutcome::InProgress);
        };

        match self.cache.contains(&track.id).await {
            Ok(true) => {
                self.known_offline.write().insert(track.id.clone());
                return Ok(DownloadOutcome::AlreadyCached);
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Could not inspect offline cache, downloading anyway"),
        }

        self.emit(CacheEvent::DownloadStarted {
            track_id: track.id.to_string(),
        });

        let payload = match self.http_client.fetch_bytes(&track.audio_url).await {
            Ok(payload) => payload,
            Err(e) => {
                error!(url = redact_url(&track.audio_url), error = %e, "Download failed");
                return Err(self.fail(track, e.to_string()));
            }
        };

        let bytes = payload.len() as u64;
        if let Err(e) = self.cache.put(&track.id, payload).await {
            error!(error = %e, "Failed to store downloaded payload");
            return Err(self.fail(track, e.to_string()));
        }

        self.known_offline.write().insert(track.id.clone());
        info!(bytes, "Track available offline");
        self.emit(CacheEvent::DownloadCompleted {
            track_id: track.id.to_string(),
            bytes,
        });

        Ok(DownloadOutcome::Downloaded { bytes })
    }

    /// Delete the offline copy of `track_id`. Failures are logged and returned.
    #[instrument(skip(self))]
    pub async fn remove(&self, track_id: &TrackId) -> Result<()> {
        if let Err(e) = self.cache.delete(track_id).await {
            error!(error = %e, "Failed to remove offline track");
            self.emit(CacheEvent::RemoveFailed {
                track_id: track_id.to_string(),
                message: e.to_string(),
            });
            return Err(e);
        }

        self.known_offline.write().remove(track_id);
        info!("Offline copy removed");
        self.emit(CacheEvent::Removed {
            track_id: track_id.to_string(),
        });
        Ok(())
    }

    fn fail(&self, track: &Track, reason: String) -> PlaybackError {
        self.emit(CacheEvent::download_failed(track.id.as_str(), reason.clone()));
        PlaybackError::DownloadFailed {
            track_id: track.id.to_string(),
            reason,
        }
    }

    fn emit(&self, event: CacheEvent) {
        self.event_bus.emit(CoreEvent::Cache(event)).ok();
    }
}

/// Marks a track as downloading for as long as it lives.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<TrackId>>,
    track_id: TrackId,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<TrackId>>, track_id: &TrackId) -> Option<Self> {
        if !set.lock().insert(track_id.clone()) {
            return None;
        }
        Some(Self {
            set,
            track_id: track_id.clone(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.track_id);
    }
}
