//! End-to-end behaviour of the composed service against in-process bridges.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_desktop::{MemoryObjectStore, NullAudioTransport, SqliteSettingsStore};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpRequest, HttpResponse};
use bridge_traits::{HttpClient, ManualClock, ObjectStore, SettingsStore, TransportSignal};
use bytes::Bytes;
use core_library::UserRole;
use core_playback::{PlayOutcome, PlaybackError};
use core_runtime::config::CoreConfig;
use core_service::views::{
    resolve, DiagnosticsView, DownloadAction, HomeView, PlayerBarView, ProfileView, Route, Screen,
};
use core_service::{CoreError, CoreService, OfflineToggle};

mockall::mock! {
    Http {}

    #[async_trait::async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

struct Fixture {
    service: CoreService,
    settings: Arc<SqliteSettingsStore>,
    objects: Arc<MemoryObjectStore>,
    transport: Arc<NullAudioTransport>,
}

async fn fixture_with(http: MockHttp, offline_cache: bool) -> Fixture {
    let settings = Arc::new(SqliteSettingsStore::in_memory().await.unwrap());
    let objects = Arc::new(MemoryObjectStore::new());
    let transport = Arc::new(NullAudioTransport::new());

    let config = CoreConfig::builder()
        .settings_store(settings.clone())
        .object_store(objects.clone())
        .http_client(Arc::new(http))
        .audio_transport(transport.clone())
        .clock(Arc::new(ManualClock::new(1_700_000_000_000)))
        .enable_offline_cache(offline_cache)
        .build()
        .unwrap();

    Fixture {
        service: CoreService::new(config).await.unwrap(),
        settings,
        objects,
        transport,
    }
}

async fn fixture() -> Fixture {
    let mut http = MockHttp::new();
    http.expect_execute().never();
    fixture_with(http, true).await
}

fn mp3(body: &'static [u8]) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: HashMap::from([("Content-Type".to_string(), "audio/mpeg".to_string())]),
        body: Bytes::from_static(body),
    }
}

#[tokio::test]
async fn test_fresh_install_starts_signed_out() {
    let fx = fixture().await;
    let session = fx.service.session();

    assert!(!session.is_signed_in().await);
    assert_eq!(resolve("#/profile", false), Screen::Login);
    assert_eq!(session.artist_tracks().await.len(), 1);
    assert!(PlayerBarView::build(fx.service.player()).is_none());
    assert!(ProfileView::build(session, fx.service.player()).await.is_none());
}

#[tokio::test]
async fn test_listener_history_shows_on_profile() {
    let fx = fixture().await;
    fx.service.session().login(UserRole::Listener).await.unwrap();

    let outcome = fx.service.play_track("2").await.unwrap();
    assert_eq!(outcome, PlayOutcome::Started);

    let profile = ProfileView::build(fx.service.session(), fx.service.player())
        .await
        .unwrap();
    match profile {
        ProfileView::Listener(listener) => {
            assert_eq!(listener.summary, "1 Songs Played");
            assert_eq!(listener.history[0].track.id.as_str(), "2");
            assert!(listener.history[0].is_current);
            assert_eq!(listener.history[0].duration, "3:20");
            assert_eq!(listener.empty_notice, None);
        }
        ProfileView::Artist(_) => panic!("listener expected"),
    }
}

#[tokio::test]
async fn test_artist_dashboard_lists_uploads() {
    let fx = fixture().await;
    let session = fx.service.session();
    session.login(UserRole::Artist).await.unwrap();

    let upload = session
        .new_upload("Night Drive", "https://cdn.test/night.mp3", None)
        .await
        .unwrap();
    session.upload_track(upload.clone()).await.unwrap();

    let found = fx.service.find_track(upload.id.as_str()).await.unwrap();
    assert_eq!(found.title, "Night Drive");

    let profile = ProfileView::build(session, fx.service.player()).await.unwrap();
    assert!(profile.is_verified_artist());
    assert_eq!(profile.summary(), "2 Releases");
}

#[tokio::test]
async fn test_play_playlist_starts_lead_track() {
    let fx = fixture().await;

    let outcome = fx.service.play_playlist("p2").await.unwrap();
    assert_eq!(outcome, Some(PlayOutcome::Started));
    assert_eq!(
        fx.service.player().current_track().unwrap().id.as_str(),
        "4"
    );

    let err = fx.service.play_playlist("p9").await.unwrap_err();
    assert!(matches!(err, CoreError::Library(_)));
}

#[tokio::test]
async fn test_home_marks_playing_track() {
    let fx = fixture().await;
    fx.service.play_track("3").await.unwrap();

    let home = HomeView::build(&fx.service);
    assert!(["Good Morning", "Good Afternoon", "Good Evening", "Good Night"]
        .contains(&home.greeting));
    assert_eq!(home.playlists.len(), 3);

    let card = home
        .tracks
        .iter()
        .find(|card| card.track.id.as_str() == "3")
        .unwrap();
    assert!(card.is_current && card.is_playing);
    assert!(home
        .tracks
        .iter()
        .filter(|card| card.track.id.as_str() != "3")
        .all(|card| !card.is_current));
}

#[tokio::test]
async fn test_player_bar_follows_transport() {
    let fx = fixture().await;
    fx.service.play_track("1").await.unwrap();
    fx.transport.emit(TransportSignal::DurationKnown(240.0));
    fx.transport.emit(TransportSignal::PositionChanged(65.0));

    let bar = PlayerBarView::build(fx.service.player()).unwrap();
    assert_eq!(bar.title, "Midnight City");
    assert_eq!(bar.elapsed, "1:05");
    assert_eq!(bar.total, "4:00");
    assert!((bar.progress - 65.0 / 240.0).abs() < 1e-9);
    assert_eq!(bar.download_action, DownloadAction::Download);
}

#[tokio::test]
async fn test_toggle_offline_downloads_then_removes() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(mp3(b"ID3-offline")));
    let fx = fixture_with(http, true).await;
    let track = fx.service.find_track("5").await.unwrap();

    let first = fx.service.toggle_offline(&track).await.unwrap();
    assert_eq!(first, OfflineToggle::Downloaded);
    assert!(fx.service.is_offline("5"));
    assert_eq!(fx.objects.len(), 1);

    fx.service.play_track("5").await.unwrap();
    let bar = PlayerBarView::build(fx.service.player()).unwrap();
    assert_eq!(bar.download_action, DownloadAction::Remove);

    let second = fx.service.toggle_offline(&track).await.unwrap();
    assert_eq!(second, OfflineToggle::Removed);
    assert!(!fx.service.is_offline("5"));
    assert!(fx.objects.is_empty());
}

#[tokio::test]
async fn test_toggle_offline_refused_when_disabled() {
    let mut http = MockHttp::new();
    http.expect_execute().never();
    let fx = fixture_with(http, false).await;
    let track = fx.service.find_track("1").await.unwrap();

    let err = fx.service.toggle_offline(&track).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Playback(PlaybackError::OfflineCacheDisabled)
    ));
}

#[tokio::test]
async fn test_offline_index_survives_restart() {
    let objects = Arc::new(MemoryObjectStore::new());
    objects
        .put("2", Bytes::from_static(b"cached"))
        .await
        .unwrap();

    let mut http = MockHttp::new();
    http.expect_execute().never();
    let config = CoreConfig::builder()
        .settings_store(Arc::new(SqliteSettingsStore::in_memory().await.unwrap()))
        .object_store(objects)
        .http_client(Arc::new(http))
        .audio_transport(Arc::new(NullAudioTransport::new()))
        .build()
        .unwrap();
    let service = CoreService::new(config).await.unwrap();

    assert!(service.is_offline("2"));
    assert!(!service.is_offline("1"));
}

#[tokio::test]
async fn test_diagnostics_on_healthy_bridges() {
    let fx = fixture().await;
    fx.service.session().login(UserRole::Listener).await.unwrap();

    let view = DiagnosticsView::build(&fx.service).await;
    assert!(view.all_passed(), "{view:?}");
    assert_eq!(view.checks[2].message, "Writable");
    assert_eq!(view.player_state["currentTrack"], "None");
    assert_eq!(view.player_state["currentTime"], "0.00");
    assert_eq!(view.user_state["historyCount"], 0);
    assert_eq!(view.user_state["artistTracksCount"], 1);

    // The check key is gone again.
    assert_eq!(fx.settings.get_string("test").await.unwrap(), None);
}

#[tokio::test]
async fn test_clear_storage_signs_out() {
    let fx = fixture().await;
    fx.service.session().login(UserRole::Artist).await.unwrap();

    fx.service.clear_storage_and_reload().await.unwrap();

    assert!(!fx.service.session().is_signed_in().await);
    assert_eq!(fx.service.session().artist_tracks().await.len(), 1);
    assert_eq!(
        resolve(Route::Profile.path(), fx.service.session().is_signed_in().await),
        Screen::Login
    );
}

#[tokio::test]
async fn test_subscribers_see_playback_events() {
    let fx = fixture().await;
    let mut stream = fx.service.subscribe();

    fx.service.play_track("1").await.unwrap();

    let event = stream.recv().await.unwrap();
    assert!(matches!(
        event,
        core_runtime::events::CoreEvent::Playback(_) | core_runtime::events::CoreEvent::Session(_)
    ));
}
