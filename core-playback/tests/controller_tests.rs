//! Playback controller behaviour against a scripted transport.

use bridge_desktop::{MemoryObjectStore, SqliteSettingsStore};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpRequest, HttpResponse};
use bridge_traits::{
    AudioSource, AudioTransport, HttpClient, ManualClock, ObjectStore, SignalHandler,
    TransportSignal,
};
use bytes::Bytes;
use core_library::{fixture_catalog, Track, TrackId};
use core_playback::{
    DownloadOutcome, OfflineCache, OfflineCacheManager, PlayOutcome, PlaybackController,
    PlaybackError,
};
use core_runtime::config::{PlaybackSettings, VolumePolicy};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus, PlaybackEvent, Receiver};
use core_session::SessionManager;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

// ============================================================================
// Fake transport
// ============================================================================

#[derive(Default)]
struct FakeTransport {
    sources: Mutex<Vec<AudioSource>>,
    plays: Mutex<usize>,
    pauses: Mutex<usize>,
    positions: Mutex<Vec<f64>>,
    volumes: Mutex<Vec<f32>>,
    handler: Mutex<Option<SignalHandler>>,
    refuse_play: AtomicBool,
    refuse_source: AtomicBool,
    held_play: Mutex<Option<Arc<Notify>>>,
}

impl FakeTransport {
    fn signal(&self, signal: TransportSignal) {
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            handler(signal);
        }
    }

    /// Make the next `play()` wait until the returned notify fires.
    fn hold_next_play(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.held_play.lock() = Some(notify.clone());
        notify
    }

    fn last_source(&self) -> Option<AudioSource> {
        self.sources.lock().last().cloned()
    }

    fn play_count(&self) -> usize {
        *self.plays.lock()
    }
}

#[async_trait::async_trait]
impl AudioTransport for FakeTransport {
    fn set_source(&self, source: AudioSource) -> BridgeResult<()> {
        if self.refuse_source.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("MEDIA_ERR_SRC_NOT_SUPPORTED".to_string()));
        }
        self.sources.lock().push(source);
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        *self.plays.lock() += 1;
        let held = self.held_play.lock().take();
        if let Some(notify) = held {
            notify.notified().await;
        }
        if self.refuse_play.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("NotAllowedError".to_string()));
        }
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        *self.pauses.lock() += 1;
        Ok(())
    }

    fn set_position(&self, seconds: f64) -> BridgeResult<()> {
        self.positions.lock().push(seconds);
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.volumes.lock().push(volume);
        Ok(())
    }

    fn set_signal_handler(&self, handler: SignalHandler) {
        *self.handler.lock() = Some(handler);
    }
}

// ============================================================================
// HTTP mock
// ============================================================================

mockall::mock! {
    Http {}

    #[async_trait::async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

/// Holds every request until released, counting how many arrived.
#[derive(Default)]
struct HeldHttp {
    release: Notify,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl HttpClient for HeldHttp {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(audio_response(b"slow-audio"))
    }
}

/// Object store whose reads always fail, as when IndexedDB is blocked.
struct UnreadableStore;

#[async_trait::async_trait]
impl ObjectStore for UnreadableStore {
    async fn put(&self, _key: &str, _value: Bytes) -> BridgeResult<()> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> BridgeResult<Option<Bytes>> {
        Err(BridgeError::OperationFailed("InvalidStateError: database closed".to_string()))
    }

    async fn delete(&self, _key: &str) -> BridgeResult<()> {
        Ok(())
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Ok(Vec::new())
    }
}

fn audio_response(body: &'static [u8]) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: HashMap::from([("Content-Type".to_string(), "audio/mpeg".to_string())]),
        body: Bytes::from_static(body),
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    controller: Arc<PlaybackController>,
    transport: Arc<FakeTransport>,
    store: Arc<MemoryObjectStore>,
    session: Arc<SessionManager>,
    events: Receiver<CoreEvent>,
}

async fn harness_with(http: MockHttp, settings: PlaybackSettings) -> Harness {
    let store = Arc::new(MemoryObjectStore::new());
    let parts = build_parts(Arc::new(http), store.clone(), settings).await;
    Harness {
        controller: parts.controller,
        transport: parts.transport,
        store,
        session: parts.session,
        events: parts.events,
    }
}

struct Parts {
    controller: Arc<PlaybackController>,
    transport: Arc<FakeTransport>,
    session: Arc<SessionManager>,
    events: Receiver<CoreEvent>,
}

async fn build_parts(
    http: Arc<dyn HttpClient>,
    store: Arc<dyn ObjectStore>,
    settings: PlaybackSettings,
) -> Parts {
    let bus = EventBus::new(256);
    let events = bus.subscribe();

    let session = Arc::new(
        SessionManager::load(
            Arc::new(SqliteSettingsStore::in_memory().await.unwrap()),
            Arc::new(ManualClock::new(0)),
            bus.clone(),
        )
        .await,
    );

    let cache = Arc::new(OfflineCacheManager::new(
        OfflineCache::new(store),
        http,
        bus.clone(),
    ));

    let transport = Arc::new(FakeTransport::default());
    let controller =
        PlaybackController::new(transport.clone(), cache, session.clone(), bus, settings);

    Parts {
        controller,
        transport,
        session,
        events,
    }
}

async fn harness() -> Harness {
    let mut http = MockHttp::new();
    http.expect_execute().never();
    harness_with(http, PlaybackSettings::default()).await
}

fn track(id: &str) -> Track {
    fixture_catalog().track(id).unwrap().clone()
}

fn drain(events: &mut Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_initial_volume_is_applied() {
    let h = harness().await;
    assert_eq!(*h.transport.volumes.lock(), vec![0.8]);
    assert_eq!(h.controller.volume(), 0.8);
    assert!(h.controller.current_track().is_none());
}

#[tokio::test]
async fn test_play_streams_uncached_track() {
    let mut h = harness().await;
    let outcome = h.controller.play(&track("1")).await.unwrap();

    assert_eq!(outcome, PlayOutcome::Started);
    assert_eq!(
        h.transport.last_source(),
        Some(AudioSource::remote(track("1").audio_url))
    );

    let state = h.controller.state();
    assert!(state.is_playing);
    assert_eq!(state.current_track.unwrap().id.as_str(), "1");
    assert_eq!(h.session.history().await[0].id.as_str(), "1");

    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        CoreEvent::Playback(PlaybackEvent::TrackChanged { source, .. }) if source == "network"
    )));
}

#[tokio::test]
async fn test_play_prefers_offline_payload() {
    let h = harness().await;
    h.store.put("2", Bytes::from_static(b"cached-audio")).await.unwrap();

    h.controller.play(&track("2")).await.unwrap();

    match h.transport.last_source() {
        Some(AudioSource::Payload { data, .. }) => assert_eq!(data, Bytes::from_static(b"cached-audio")),
        other => panic!("expected offline payload, got {other:?}"),
    }
}

#[tokio::test]
async fn test_play_active_track_toggles() {
    let h = harness().await;
    let midnight = track("1");

    h.controller.play(&midnight).await.unwrap();
    assert_eq!(h.controller.play(&midnight).await.unwrap(), PlayOutcome::Toggled);
    assert!(!h.controller.is_playing());
    assert_eq!(*h.transport.pauses.lock(), 1);

    assert_eq!(h.controller.play(&midnight).await.unwrap(), PlayOutcome::Toggled);
    assert!(h.controller.is_playing());
    assert_eq!(h.controller.current_track().unwrap().id.as_str(), "1");
    assert_eq!(h.transport.sources.lock().len(), 1);
}

#[tokio::test]
async fn test_toggle_without_track_is_noop() {
    let h = harness().await;
    h.controller.toggle().await.unwrap();
    assert_eq!(h.transport.play_count(), 0);
    assert_eq!(*h.transport.pauses.lock(), 0);
}

#[tokio::test]
async fn test_switching_tracks_resets_position_and_duration() {
    let h = harness().await;
    h.controller.play(&track("1")).await.unwrap();
    h.transport.signal(TransportSignal::DurationKnown(240.0));
    h.transport.signal(TransportSignal::PositionChanged(100.0));
    assert_eq!(h.controller.state().position, 100.0);

    h.controller.play(&track("3")).await.unwrap();
    let state = h.controller.state();
    assert_eq!(state.position, 0.0);
    assert_eq!(state.duration, 0.0);
}

#[tokio::test]
async fn test_refused_play_leaves_player_paused() {
    let mut h = harness().await;
    h.transport.refuse_play.store(true, Ordering::SeqCst);

    let err = h.controller.play(&track("4")).await.unwrap_err();
    assert!(matches!(err, PlaybackError::PlaybackFailed(_)));

    let state = h.controller.state();
    assert!(!state.is_playing);
    assert_eq!(state.current_track.unwrap().id.as_str(), "4");

    assert!(drain(&mut h.events)
        .iter()
        .any(|e| matches!(e, CoreEvent::Playback(PlaybackEvent::Error { .. }))));
}

#[tokio::test]
async fn test_superseded_play_never_marks_playing() {
    let h = harness().await;
    let release_first = h.transport.hold_next_play();

    let controller = h.controller.clone();
    let first = tokio::spawn(async move { controller.play(&track("1")).await });

    while h.transport.play_count() == 0 {
        tokio::task::yield_now().await;
    }

    let second = h.controller.play(&track("2")).await.unwrap();
    assert_eq!(second, PlayOutcome::Started);

    release_first.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first, PlayOutcome::Superseded);

    let state = h.controller.state();
    assert_eq!(state.current_track.unwrap().id.as_str(), "2");
    assert!(state.is_playing);
    assert_eq!(
        h.transport.last_source(),
        Some(AudioSource::remote(track("2").audio_url))
    );
}

#[tokio::test]
async fn test_signals_update_state() {
    let mut h = harness().await;
    h.controller.play(&track("5")).await.unwrap();
    drain(&mut h.events);

    h.transport.signal(TransportSignal::DurationKnown(355.0));
    h.transport.signal(TransportSignal::PositionChanged(12.5));
    let state = h.controller.state();
    assert_eq!(state.duration, 355.0);
    assert_eq!(state.position, 12.5);

    h.transport.signal(TransportSignal::Ended);
    assert!(!h.controller.is_playing());
    assert_eq!(h.controller.current_track().unwrap().id.as_str(), "5");

    let events = drain(&mut h.events);
    assert!(events.contains(&CoreEvent::Playback(PlaybackEvent::PositionChanged {
        track_id: "5".to_string(),
        position_ms: 12_500,
        duration_ms: 355_000,
    })));
    assert!(events.contains(&CoreEvent::Playback(PlaybackEvent::Ended {
        track_id: "5".to_string(),
    })));
}

#[tokio::test]
async fn test_seek_moves_transport_and_clamps() {
    let h = harness().await;
    h.controller.seek(30.0).unwrap();
    assert!(h.transport.positions.lock().is_empty());

    h.controller.play(&track("1")).await.unwrap();
    h.transport.signal(TransportSignal::DurationKnown(240.0));

    h.controller.seek(30.0).unwrap();
    assert_eq!(h.controller.state().position, 30.0);

    h.controller.seek(999.0).unwrap();
    h.controller.seek(-5.0).unwrap();
    assert_eq!(*h.transport.positions.lock(), vec![30.0, 240.0, 0.0]);

    assert!(matches!(
        h.controller.seek(f64::NAN),
        Err(PlaybackError::InvalidPosition(_))
    ));
}

#[tokio::test]
async fn test_volume_clamp_policy() {
    let h = harness().await;
    assert_eq!(h.controller.set_volume(0.5).unwrap(), 0.5);
    assert_eq!(h.controller.set_volume(1.7).unwrap(), 1.0);
    assert_eq!(h.controller.set_volume(-0.2).unwrap(), 0.0);
    assert!(matches!(
        h.controller.set_volume(f32::NAN),
        Err(PlaybackError::InvalidVolume(_))
    ));
    assert_eq!(h.controller.volume(), 0.0);
}

#[tokio::test]
async fn test_volume_reject_policy() {
    let mut http = MockHttp::new();
    http.expect_execute().never();
    let h = harness_with(
        http,
        PlaybackSettings {
            default_volume: 0.8,
            volume_policy: VolumePolicy::Reject,
        },
    )
    .await;

    assert!(matches!(
        h.controller.set_volume(1.5),
        Err(PlaybackError::InvalidVolume(v)) if v == 1.5
    ));
    assert_eq!(h.controller.volume(), 0.8);
    assert_eq!(h.controller.set_volume(1.0).unwrap(), 1.0);
}

#[tokio::test]
async fn test_download_then_remove() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(audio_response(b"downloaded")));
    let mut h = harness_with(http, PlaybackSettings::default()).await;

    let high_in_you = track("6");
    let id = TrackId::from("6");

    let outcome = h.controller.download(&high_in_you).await.unwrap();
    assert_eq!(outcome, DownloadOutcome::Downloaded { bytes: 10 });
    assert!(h.controller.is_offline(&id));
    assert_eq!(
        h.controller.download(&high_in_you).await.unwrap(),
        DownloadOutcome::AlreadyCached
    );

    h.controller.play(&high_in_you).await.unwrap();
    assert!(!h.transport.last_source().unwrap().is_remote());

    h.controller.remove_offline(&id).await.unwrap();
    assert!(!h.controller.is_offline(&id));
    assert!(h.store.is_empty());

    let events = drain(&mut h.events);
    assert!(events.contains(&CoreEvent::Cache(CacheEvent::Removed {
        track_id: "6".to_string()
    })));
}

#[tokio::test]
async fn test_failed_download_keeps_track_streaming() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .returning(|_| Err(BridgeError::OperationFailed("TypeError: Failed to fetch".to_string())));
    let h = harness_with(http, PlaybackSettings::default()).await;

    let err = h.controller.download(&track("3")).await.unwrap_err();
    assert!(matches!(err, PlaybackError::DownloadFailed { .. }));
    assert!(!h.controller.is_offline(&TrackId::from("3")));

    h.controller.play(&track("3")).await.unwrap();
    assert!(h.transport.last_source().unwrap().is_remote());
}

#[tokio::test]
async fn test_dropped_controller_ignores_signals() {
    let h = harness().await;
    let transport = h.transport.clone();
    drop(h);
    transport.signal(TransportSignal::Ended);
}

#[tokio::test]
async fn test_unreadable_cache_aborts_play() {
    let mut http = MockHttp::new();
    http.expect_execute().never();
    let mut parts = build_parts(
        Arc::new(http),
        Arc::new(UnreadableStore),
        PlaybackSettings::default(),
    )
    .await;

    let err = parts.controller.play(&track("2")).await.unwrap_err();
    assert!(matches!(err, PlaybackError::CacheError(_)));
    assert!(!parts.controller.is_playing());
    assert!(parts.transport.sources.lock().is_empty());
    assert_eq!(parts.transport.play_count(), 0);

    assert!(drain(&mut parts.events).iter().any(|e| matches!(
        e,
        CoreEvent::Playback(PlaybackEvent::Error { track_id: Some(id), .. }) if id == "2"
    )));
}

#[tokio::test]
async fn test_signals_ignored_until_new_source_loads() {
    let h = harness().await;
    h.controller.play(&track("1")).await.unwrap();
    h.transport.signal(TransportSignal::DurationKnown(240.0));

    h.transport.refuse_source.store(true, Ordering::SeqCst);
    let err = h.controller.play(&track("3")).await.unwrap_err();
    assert!(matches!(err, PlaybackError::SourceUnavailable(_)));

    // Late reports from the previous source.
    h.transport.signal(TransportSignal::DurationKnown(240.0));
    h.transport.signal(TransportSignal::PositionChanged(200.0));
    let state = h.controller.state();
    assert_eq!(state.current_track.unwrap().id.as_str(), "3");
    assert_eq!(state.duration, 0.0);
    assert_eq!(state.position, 0.0);

    h.transport.refuse_source.store(false, Ordering::SeqCst);
    h.controller.play(&track("4")).await.unwrap();
    h.transport.signal(TransportSignal::DurationKnown(300.0));
    assert_eq!(h.controller.state().duration, 300.0);
}

#[tokio::test]
async fn test_overlapping_downloads_fetch_once() {
    let http = Arc::new(HeldHttp::default());
    let parts = build_parts(
        http.clone(),
        Arc::new(MemoryObjectStore::new()),
        PlaybackSettings::default(),
    )
    .await;
    let id = TrackId::from("5");

    let controller = parts.controller.clone();
    let first = tokio::spawn(async move { controller.download(&track("5")).await });

    while http.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert!(parts.controller.is_downloading(&id));

    let second = parts.controller.download(&track("5")).await.unwrap();
    assert_eq!(second, DownloadOutcome::InProgress);

    http.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first, DownloadOutcome::Downloaded { bytes: 10 });
    assert_eq!(http.calls.load(Ordering::SeqCst), 1);
    assert!(parts.controller.is_offline(&id));
    assert!(!parts.controller.is_downloading(&id));
}
