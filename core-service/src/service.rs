//! Composition root.
//!
//! [`CoreService`] turns a validated [`CoreConfig`] into the three long-lived
//! services (session, offline cache, player) and hands them out as `Arc`
//! handles. It is built once per app and owns nothing global.

use std::sync::Arc;

use core_library::{fixture_catalog, Catalog, LibraryError, Track, TrackId};
use core_playback::{
    DownloadOutcome, OfflineCache, OfflineCacheManager, PlayOutcome, PlaybackController,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use core_session::SessionManager;
use tracing::{info, instrument, warn};

use crate::error::Result;

/// What toggling the offline copy of a track ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineToggle {
    Downloaded,
    Removed,
    /// A download for this track is already running.
    Busy,
}

#[derive(Clone)]
pub struct CoreService {
    config: CoreConfig,
    event_bus: EventBus,
    session: Arc<SessionManager>,
    player: Arc<PlaybackController>,
}

impl CoreService {
    /// Load persisted state, index the offline cache and attach the player.
    #[instrument(skip_all)]
    pub async fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let session = Arc::new(
            SessionManager::load(
                Arc::clone(&config.settings_store),
                Arc::clone(&config.clock),
                event_bus.clone(),
            )
            .await,
        );

        let cache = OfflineCacheManager::new(
            OfflineCache::new(Arc::clone(&config.object_store)),
            Arc::clone(&config.http_client),
            event_bus.clone(),
        )
        .with_downloads_enabled(config.features.enable_offline_cache);

        match cache.refresh().await {
            Ok(count) => info!(offline_tracks = count, "Offline cache indexed"),
            Err(e) => warn!(error = %e, "Offline cache unavailable, starting with none"),
        }

        let player = PlaybackController::new(
            Arc::clone(&config.audio_transport),
            Arc::new(cache),
            Arc::clone(&session),
            event_bus.clone(),
            config.playback,
        );

        info!("Core service ready");
        Ok(Self {
            config,
            event_bus,
            session,
            player,
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn player(&self) -> &Arc<PlaybackController> {
        &self.player
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// New subscription to every core event.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    pub fn catalog(&self) -> &'static Catalog {
        fixture_catalog()
    }

    /// Find a track in the fixture catalog or, failing that, in the artist's releases.
    pub async fn find_track(&self, id: &str) -> Result<Track> {
        if let Ok(track) = self.catalog().track(id) {
            return Ok(track.clone());
        }
        self.session
            .artist_tracks()
            .await
            .into_iter()
            .find(|track| track.id.as_str() == id)
            .ok_or_else(|| LibraryError::not_found("Track", id).into())
    }

    pub async fn play_track(&self, id: &str) -> Result<PlayOutcome> {
        let track = self.find_track(id).await?;
        Ok(self.player.play(&track).await?)
    }

    /// Play the first track of a playlist. `None` when the playlist is empty.
    pub async fn play_playlist(&self, id: &str) -> Result<Option<PlayOutcome>> {
        let playlist = self.catalog().playlist(id)?;
        match playlist.tracks.first() {
            Some(track) => Ok(Some(self.player.play(track).await?)),
            None => Ok(None),
        }
    }

    /// Download the track when it is streamed, drop the local copy when it is offline.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn toggle_offline(&self, track: &Track) -> Result<OfflineToggle> {
        if self.player.is_offline(&track.id) {
            self.player.remove_offline(&track.id).await?;
            return Ok(OfflineToggle::Removed);
        }
        if self.player.is_downloading(&track.id) {
            return Ok(OfflineToggle::Busy);
        }
        match self.player.download(track).await? {
            DownloadOutcome::InProgress => Ok(OfflineToggle::Busy),
            _ => Ok(OfflineToggle::Downloaded),
        }
    }

    /// Whether the fixture or uploaded track `id` is held offline.
    pub fn is_offline(&self, id: &str) -> bool {
        self.player.is_offline(&TrackId::from(id))
    }

    /// Wipe the key-value store and re-read session state, as a page reload would.
    #[instrument(skip(self))]
    pub async fn clear_storage_and_reload(&self) -> Result<()> {
        self.config.settings_store.clear_all().await?;
        self.session.reload().await;
        info!("Key-value store cleared");
        Ok(())
    }
}
