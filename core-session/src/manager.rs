//! # Session Manager
//!
//! Owns the active user, the listening history and the artist catalog.
//!
//! ## Consistency
//!
//! Mutations are serialized by a write gate. Each one computes the new value,
//! writes it to durable storage and only then publishes it in memory. If the
//! write fails the error is returned, a
//! [`SessionEvent::PersistenceFailed`] is emitted and readers keep seeing the
//! previous state.
//!
//! ## Usage
//!
//! ```ignore
//! use core_library::UserRole;
//! use core_session::SessionManager;
//!
//! let session = SessionManager::load(settings, clock, event_bus).await;
//! session.login(UserRole::Artist).await?;
//! let draft = session.new_upload("Night Drive", "https://cdn.test/night.mp3", None).await?;
//! session.upload_track(draft).await?;
//! ```

use crate::error::{Result, SessionError};
use crate::storage::{
    Persisted, SessionStorage, ARTIST_TRACKS_KEY, HISTORY_KEY, SIGN_OUT_KEYS, USER_KEY,
};
use bridge_traits::{Clock, SettingsStore};
use core_library::{fixture_catalog, LibraryError, Track, User, UserRole};
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Maximum number of tracks kept in the listening history.
pub const HISTORY_LIMIT: usize = 50;

/// Avatar assigned at sign-in.
pub const DEFAULT_AVATAR_URL: &str = "https://picsum.photos/id/64/200/200";

/// Cover used for uploads that do not provide one.
pub const DEFAULT_COVER_URL: &str = "https://picsum.photos/300/300";

const DEFAULT_USER_ID: &str = "u1";
const UPLOAD_DURATION_SECS: u32 = 180;

#[derive(Debug, Clone, Default)]
struct SessionState {
    user: Option<User>,
    history: Vec<Track>,
    artist_tracks: Vec<Track>,
}

/// Point-in-time copy of the session, used by the diagnostics inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub history: Vec<Track>,
    pub artist_tracks: Vec<Track>,
}

pub struct SessionManager {
    storage: SessionStorage,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    state: RwLock<SessionState>,
    write_gate: Mutex<()>,
}

impl SessionManager {
    /// Build the manager from whatever the settings store holds.
    ///
    /// Never fails: unreadable or corrupt values start empty. A missing
    /// artist catalog is seeded with the fixture release and written back.
    pub async fn load(
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
    ) -> Self {
        let storage = SessionStorage::new(settings);
        let state = read_state(&storage).await;

        info!(
            signed_in = state.user.is_some(),
            history_len = state.history.len(),
            catalog_len = state.artist_tracks.len(),
            "Session loaded"
        );

        Self {
            storage,
            clock,
            event_bus,
            state: RwLock::new(state),
            write_gate: Mutex::new(()),
        }
    }

    /// Re-read every persisted collection, discarding in-memory state.
    #[instrument(skip(self))]
    pub async fn reload(&self) {
        let _gate = self.write_gate.lock().await;
        let state = read_state(&self.storage).await;
        let track_count = state.artist_tracks.len();
        *self.state.write().await = state;

        debug!(track_count, "Session reloaded");
        self.emit(SessionEvent::CatalogUpdated { track_count });
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Sign in as the demo account for `role`. No credentials involved.
    #[instrument(skip(self))]
    pub async fn login(&self, role: UserRole) -> Result<User> {
        let _gate = self.write_gate.lock().await;

        let user = User {
            id: DEFAULT_USER_ID.to_string(),
            name: role.default_display_name().to_string(),
            role,
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
        };

        self.persist(USER_KEY, &user).await?;
        self.state.write().await.user = Some(user.clone());

        info!(user_id = %user.id, role = %role, "Signed in");
        self.emit(SessionEvent::SignedIn {
            user_id: user.id.clone(),
            role: role.as_str().to_string(),
        });

        Ok(user)
    }

    /// Forget the user, their history and comic progress. The artist catalog is kept.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let _gate = self.write_gate.lock().await;

        for key in SIGN_OUT_KEYS {
            if let Err(err) = self.storage.remove(key).await {
                self.emit(SessionEvent::PersistenceFailed {
                    key: key.to_string(),
                    message: err.to_string(),
                });
                return Err(err);
            }
        }

        let previous = {
            let mut state = self.state.write().await;
            state.history.clear();
            state.user.take()
        };

        if let Some(user) = previous {
            info!(user_id = %user.id, "Signed out");
            self.emit(SessionEvent::SignedOut { user_id: user.id });
        }

        Ok(())
    }

    /// Replace the active user's avatar.
    #[instrument(skip(self))]
    pub async fn update_avatar(&self, url: &str) -> Result<User> {
        let _gate = self.write_gate.lock().await;

        let url = url.trim();
        if url.is_empty() {
            return Err(LibraryError::invalid("avatarUrl", "Avatar URL cannot be empty").into());
        }

        let mut user = self.state.read().await.user.clone().ok_or(SessionError::NotSignedIn)?;
        user.avatar_url = url.to_string();

        self.persist(USER_KEY, &user).await?;
        self.state.write().await.user = Some(user.clone());

        self.emit(SessionEvent::AvatarUpdated {
            user_id: user.id.clone(),
        });
        Ok(user)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Move `track` to the front of the history, dropping older duplicates.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn add_to_history(&self, track: &Track) -> Result<()> {
        let _gate = self.write_gate.lock().await;

        let mut history = self.state.read().await.history.clone();
        history.retain(|t| t.id != track.id);
        history.insert(0, track.clone());
        history.truncate(HISTORY_LIMIT);

        self.persist(HISTORY_KEY, &history).await?;
        let len = history.len();
        self.state.write().await.history = history;

        self.emit(SessionEvent::HistoryUpdated {
            latest_track_id: track.id.to_string(),
            len,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Artist catalog
    // ------------------------------------------------------------------

    /// Draft the track an artist is about to upload.
    ///
    /// The id is `art-<unix millis>` and the duration a nominal 180 seconds.
    /// A blank cover falls back to [`DEFAULT_COVER_URL`].
    pub async fn new_upload(
        &self,
        title: &str,
        audio_url: &str,
        cover_url: Option<&str>,
    ) -> Result<Track> {
        let artist = self.require_artist().await?;

        let cover_url = cover_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_COVER_URL);

        let track = Track::new(
            format!("art-{}", self.clock.unix_timestamp_millis()),
            title.trim(),
            artist.name,
            cover_url,
            audio_url.trim(),
            UPLOAD_DURATION_SECS,
        );
        track.validate()?;

        Ok(track)
    }

    /// Add a release to the front of the artist catalog.
    ///
    /// An existing release with the same id is replaced.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn upload_track(&self, track: Track) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        self.require_artist().await?;
        track.validate()?;

        let mut catalog = self.state.read().await.artist_tracks.clone();
        catalog.retain(|t| t.id != track.id);
        catalog.insert(0, track);

        self.commit_catalog(catalog).await
    }

    /// Remove a release. Returns `false` when no release has that id.
    #[instrument(skip(self))]
    pub async fn delete_track(&self, track_id: &str) -> Result<bool> {
        let _gate = self.write_gate.lock().await;
        self.require_artist().await?;

        let mut catalog = self.state.read().await.artist_tracks.clone();
        let before = catalog.len();
        catalog.retain(|t| t.id.as_str() != track_id);
        if catalog.len() == before {
            debug!(track_id, "No such release");
            return Ok(false);
        }

        self.commit_catalog(catalog).await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    pub async fn history(&self) -> Vec<Track> {
        self.state.read().await.history.clone()
    }

    pub async fn artist_tracks(&self) -> Vec<Track> {
        self.state.read().await.artist_tracks.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            user: state.user.clone(),
            history: state.history.clone(),
            artist_tracks: state.artist_tracks.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn require_artist(&self) -> Result<User> {
        match self.state.read().await.user.clone() {
            Some(user) if user.is_artist() => Ok(user),
            Some(_) => Err(SessionError::NotArtist),
            None => Err(SessionError::NotSignedIn),
        }
    }

    async fn commit_catalog(&self, catalog: Vec<Track>) -> Result<()> {
        self.persist(ARTIST_TRACKS_KEY, &catalog).await?;
        let track_count = catalog.len();
        self.state.write().await.artist_tracks = catalog;

        info!(track_count, "Artist catalog updated");
        self.emit(SessionEvent::CatalogUpdated { track_count });
        Ok(())
    }

    async fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        if let Err(err) = self.storage.write_json(key, value).await {
            self.emit(SessionEvent::PersistenceFailed {
                key: key.to_string(),
                message: err.to_string(),
            });
            return Err(err);
        }
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        self.event_bus.emit(CoreEvent::Session(event)).ok();
    }
}

async fn read_state(storage: &SessionStorage) -> SessionState {
    let user = match storage.read_json::<User>(USER_KEY).await {
        Ok(saved) => saved.into_option(),
        Err(err) => {
            warn!(error = %err, "Starting signed out");
            None
        }
    };

    let mut history = match storage.read_json::<Vec<Track>>(HISTORY_KEY).await {
        Ok(saved) => saved.into_option().unwrap_or_default(),
        Err(err) => {
            warn!(error = %err, "Starting with empty history");
            Vec::new()
        }
    };
    history.truncate(HISTORY_LIMIT);

    let artist_tracks = match storage.read_json::<Vec<Track>>(ARTIST_TRACKS_KEY).await {
        Ok(Persisted::Present(tracks)) => tracks,
        Ok(Persisted::Corrupt(_)) => Vec::new(),
        Ok(Persisted::Absent) => {
            let seed = fixture_catalog().seed_artist_tracks();
            if let Err(err) = storage.write_json(ARTIST_TRACKS_KEY, &seed).await {
                warn!(error = %err, "Failed to persist seeded artist catalog");
            }
            seed
        }
        Err(err) => {
            warn!(error = %err, "Using seeded artist catalog");
            fixture_catalog().seed_artist_tracks()
        }
    };

    SessionState {
        user,
        history,
        artist_tracks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::COMIC_PROGRESS_KEY;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::ManualClock;
    use core_runtime::events::Receiver;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory settings store whose writes can be made to fail.
    #[derive(Default)]
    struct FlakySettings {
        values: Mutex<HashMap<String, String>>,
        fail_writes: AtomicBool,
        fail_deletes: AtomicBool,
    }

    impl FlakySettings {
        async fn raw(&self, key: &str) -> Option<String> {
            self.values.lock().await.get(key).cloned()
        }

        async fn insert(&self, key: &str, value: &str) {
            self.values.lock().await.insert(key.to_string(), value.to_string());
        }
    }

    #[async_trait]
    impl SettingsStore for FlakySettings {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(BridgeError::OperationFailed("QuotaExceededError".to_string()));
            }
            self.insert(key, value).await;
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.raw(key).await)
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(BridgeError::OperationFailed("storage locked".to_string()));
            }
            self.values.lock().await.remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.values.lock().await.keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.values.lock().await.clear();
            Ok(())
        }
    }

    const NOW_MILLIS: i64 = 1_718_000_000_000;

    async fn manager_with(settings: Arc<FlakySettings>) -> (SessionManager, Receiver<CoreEvent>) {
        let bus = EventBus::new(64);
        let events = bus.subscribe();
        let manager =
            SessionManager::load(settings, Arc::new(ManualClock::new(NOW_MILLIS)), bus).await;
        (manager, events)
    }

    fn track(id: &str) -> Track {
        Track::new(id, format!("Track {id}"), "Someone", "cover", "https://cdn.test/a.mp3", 100)
    }

    #[tokio::test]
    async fn test_login_persists_user() {
        let settings = Arc::new(FlakySettings::default());
        let (manager, _events) = manager_with(settings.clone()).await;

        let user = manager.login(UserRole::Artist).await.unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.name, "Karan Ahuja");
        assert_eq!(user.avatar_url, DEFAULT_AVATAR_URL);

        let raw = settings.raw(USER_KEY).await.unwrap();
        assert!(raw.contains(r#""type":"artist""#));
        assert_eq!(manager.current_user().await, Some(user));
    }

    #[tokio::test]
    async fn test_listener_login_name() {
        let (manager, _events) = manager_with(Arc::new(FlakySettings::default())).await;
        let user = manager.login(UserRole::Listener).await.unwrap();
        assert_eq!(user.name, "Music Fan");
        assert!(!user.is_artist());
    }

    #[tokio::test]
    async fn test_missing_catalog_is_seeded_and_saved() {
        let settings = Arc::new(FlakySettings::default());
        let (manager, _events) = manager_with(settings.clone()).await;

        let catalog = manager.artist_tracks().await;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id.as_str(), "6");
        assert!(settings.raw(ARTIST_TRACKS_KEY).await.unwrap().contains("High In You"));
    }

    #[tokio::test]
    async fn test_corrupt_values_load_as_empty() {
        let settings = Arc::new(FlakySettings::default());
        settings.insert(USER_KEY, "{oops").await;
        settings.insert(HISTORY_KEY, "42").await;
        settings.insert(ARTIST_TRACKS_KEY, "[{]").await;

        let (manager, _events) = manager_with(settings).await;
        assert!(!manager.is_signed_in().await);
        assert!(manager.history().await.is_empty());
        assert!(manager.artist_tracks().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_moves_replayed_track_to_front() {
        let (manager, _events) = manager_with(Arc::new(FlakySettings::default())).await;

        for id in ["1", "2", "3"] {
            manager.add_to_history(&track(id)).await.unwrap();
        }
        manager.add_to_history(&track("1")).await.unwrap();

        let ids: Vec<String> = manager
            .history()
            .await
            .iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let settings = Arc::new(FlakySettings::default());
        let (manager, _events) = manager_with(settings.clone()).await;

        for i in 0..60 {
            manager.add_to_history(&track(&i.to_string())).await.unwrap();
        }

        let history = manager.history().await;
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].id.as_str(), "59");
        assert_eq!(history[HISTORY_LIMIT - 1].id.as_str(), "10");

        let saved: Vec<Track> =
            serde_json::from_str(&settings.raw(HISTORY_KEY).await.unwrap()).unwrap();
        assert_eq!(saved, history);
    }

    #[tokio::test]
    async fn test_logout_keeps_catalog() {
        let settings = Arc::new(FlakySettings::default());
        settings.insert(COMIC_PROGRESS_KEY, r#"{"c1":2}"#).await;
        let (manager, mut events) = manager_with(settings.clone()).await;

        manager.login(UserRole::Artist).await.unwrap();
        manager.add_to_history(&track("1")).await.unwrap();
        manager.logout().await.unwrap();

        assert!(manager.current_user().await.is_none());
        assert!(manager.history().await.is_empty());
        assert!(!manager.artist_tracks().await.is_empty());

        assert!(settings.raw(USER_KEY).await.is_none());
        assert!(settings.raw(HISTORY_KEY).await.is_none());
        assert!(settings.raw(COMIC_PROGRESS_KEY).await.is_none());
        assert!(settings.raw(ARTIST_TRACKS_KEY).await.is_some());

        let mut saw_sign_out = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, CoreEvent::Session(SessionEvent::SignedOut { ref user_id }) if user_id == "u1") {
                saw_sign_out = true;
            }
        }
        assert!(saw_sign_out);
    }

    #[tokio::test]
    async fn test_failed_logout_leaves_session() {
        let settings = Arc::new(FlakySettings::default());
        let (manager, _events) = manager_with(settings.clone()).await;
        manager.login(UserRole::Listener).await.unwrap();

        settings.fail_deletes.store(true, Ordering::SeqCst);
        assert!(manager.logout().await.is_err());
        assert!(manager.is_signed_in().await);
    }

    #[tokio::test]
    async fn test_listener_cannot_manage_releases() {
        let (manager, _events) = manager_with(Arc::new(FlakySettings::default())).await;

        assert!(matches!(
            manager.upload_track(track("x")).await,
            Err(SessionError::NotSignedIn)
        ));

        manager.login(UserRole::Listener).await.unwrap();
        assert!(matches!(
            manager.upload_track(track("x")).await,
            Err(SessionError::NotArtist)
        ));
        assert!(matches!(
            manager.delete_track("6").await,
            Err(SessionError::NotArtist)
        ));
        assert!(matches!(
            manager.new_upload("t", "https://cdn.test/t.mp3", None).await,
            Err(SessionError::NotArtist)
        ));
    }

    #[tokio::test]
    async fn test_upload_and_delete_release() {
        let settings = Arc::new(FlakySettings::default());
        let (manager, _events) = manager_with(settings.clone()).await;
        manager.login(UserRole::Artist).await.unwrap();

        let draft = manager
            .new_upload("  Night Drive ", "https://cdn.test/night.mp3", Some("  "))
            .await
            .unwrap();
        assert_eq!(draft.id.as_str(), format!("art-{NOW_MILLIS}"));
        assert_eq!(draft.title, "Night Drive");
        assert_eq!(draft.artist, "Karan Ahuja");
        assert_eq!(draft.cover_url, DEFAULT_COVER_URL);
        assert_eq!(draft.duration, 180);

        manager.upload_track(draft.clone()).await.unwrap();
        let catalog = manager.artist_tracks().await;
        assert_eq!(catalog[0], draft);
        assert_eq!(catalog.len(), 2);

        assert!(manager.delete_track(draft.id.as_str()).await.unwrap());
        assert!(!manager.delete_track("missing").await.unwrap());

        let saved: Vec<Track> =
            serde_json::from_str(&settings.raw(ARTIST_TRACKS_KEY).await.unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn test_new_upload_requires_title() {
        let (manager, _events) = manager_with(Arc::new(FlakySettings::default())).await;
        manager.login(UserRole::Artist).await.unwrap();

        let err = manager
            .new_upload("   ", "https://cdn.test/a.mp3", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Library(LibraryError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let settings = Arc::new(FlakySettings::default());
        let (manager, mut events) = manager_with(settings.clone()).await;
        manager.add_to_history(&track("1")).await.unwrap();
        while events.try_recv().is_ok() {}

        settings.fail_writes.store(true, Ordering::SeqCst);
        let err = manager.add_to_history(&track("2")).await.unwrap_err();
        assert!(matches!(err, SessionError::StorageUnavailable { .. }));

        let history = manager.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id.as_str(), "1");

        match events.try_recv().unwrap() {
            CoreEvent::Session(SessionEvent::PersistenceFailed { key, .. }) => {
                assert_eq!(key, HISTORY_KEY)
            }
            other => panic!("unexpected event {other:?}"),
        }

        assert!(manager.login(UserRole::Artist).await.is_err());
        assert!(!manager.is_signed_in().await);
    }

    #[tokio::test]
    async fn test_update_avatar() {
        let settings = Arc::new(FlakySettings::default());
        let (manager, _events) = manager_with(settings.clone()).await;

        assert!(matches!(
            manager.update_avatar("https://img.test/me.png").await,
            Err(SessionError::NotSignedIn)
        ));

        manager.login(UserRole::Listener).await.unwrap();
        let user = manager.update_avatar("  https://img.test/me.png ").await.unwrap();
        assert_eq!(user.avatar_url, "https://img.test/me.png");
        assert!(settings.raw(USER_KEY).await.unwrap().contains("https://img.test/me.png"));

        assert!(manager.update_avatar("").await.is_err());
        assert_eq!(
            manager.current_user().await.unwrap().avatar_url,
            "https://img.test/me.png"
        );
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_changes() {
        let settings = Arc::new(FlakySettings::default());
        let (manager, _events) = manager_with(settings.clone()).await;
        manager.login(UserRole::Artist).await.unwrap();

        settings.clear_all().await.unwrap();
        manager.reload().await;

        assert!(!manager.is_signed_in().await);
        assert_eq!(manager.artist_tracks().await.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_serializes() {
        let (manager, _events) = manager_with(Arc::new(FlakySettings::default())).await;
        manager.login(UserRole::Listener).await.unwrap();

        let json = serde_json::to_value(manager.snapshot().await).unwrap();
        assert_eq!(json["user"]["type"], "user");
        assert!(json["artistTracks"].is_array());
    }
}
