//! Diagnostics page: capability checks, formatter self-tests, state inspector
//! and a few destructive actions for manual testing.

use core_library::format_time;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::service::CoreService;

/// Key written and removed again by the key-value check.
const CHECK_KEY: &str = "test";

pub const CRASH_MESSAGE: &str = "Manual Test Error Triggered!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemCheck {
    pub name: &'static str,
    pub passed: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatterCase {
    pub name: &'static str,
    pub expected: &'static str,
    pub actual: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsView {
    pub checks: Vec<SystemCheck>,
    pub formatter: Vec<FormatterCase>,
    pub player_state: Value,
    pub user_state: Value,
}

impl DiagnosticsView {
    pub async fn build(service: &CoreService) -> Self {
        Self {
            checks: run_system_checks(service).await,
            formatter: formatter_self_tests(),
            player_state: player_state_json(service),
            user_state: user_state_json(service).await,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed) && self.formatter.iter().all(|c| c.passed)
    }
}

#[instrument(skip_all)]
pub async fn run_system_checks(service: &CoreService) -> Vec<SystemCheck> {
    let config = service.config();

    let audio = config
        .audio_transport
        .set_volume(service.player().volume())
        .is_ok();
    let objects = config.object_store.list_keys().await.is_ok();
    let settings = check_settings(service).await;
    debug!(audio, objects, settings, "System checks finished");

    vec![
        SystemCheck {
            name: "Audio API",
            passed: audio,
            message: supported(audio),
        },
        SystemCheck {
            name: "IndexedDB",
            passed: objects,
            message: supported(objects),
        },
        SystemCheck {
            name: "LocalStorage",
            passed: settings,
            message: if settings { "Writable" } else { "Not Writable" },
        },
    ]
}

async fn check_settings(service: &CoreService) -> bool {
    let store = &service.config().settings_store;
    store.set_string(CHECK_KEY, CHECK_KEY).await.is_ok() && store.delete(CHECK_KEY).await.is_ok()
}

fn supported(ok: bool) -> &'static str {
    if ok {
        "Supported"
    } else {
        "Not Supported"
    }
}

pub fn formatter_self_tests() -> Vec<FormatterCase> {
    const CASES: [(&str, f64, &str); 5] = [
        ("format_time(0) should be 0:00", 0.0, "0:00"),
        ("format_time(65) should be 1:05", 65.0, "1:05"),
        ("format_time(3600) should be 60:00", 3600.0, "60:00"),
        ("format_time(59.9) should be 0:59", 59.9, "0:59"),
        ("format_time(-10) should handle negative", -10.0, "0:00"),
    ];

    CASES
        .into_iter()
        .map(|(name, input, expected)| {
            let actual = format_time(input);
            FormatterCase {
                name,
                expected,
                passed: actual == expected,
                actual,
            }
        })
        .collect()
}

pub fn player_state_json(service: &CoreService) -> Value {
    let player = service.player();
    let state = player.state();
    let is_downloading = state
        .current_track
        .as_ref()
        .is_some_and(|t| player.is_downloading(&t.id));
    let current = match &state.current_track {
        Some(track) => json!({ "id": track.id, "title": track.title }),
        None => json!("None"),
    };

    json!({
        "isPlaying": state.is_playing,
        "currentTime": format!("{:.2}", state.position),
        "duration": state.duration,
        "volume": state.volume,
        "isDownloading": is_downloading,
        "offlineTracksCount": player.cache().offline_ids().len(),
        "currentTrack": current,
    })
}

pub async fn user_state_json(service: &CoreService) -> Value {
    let snapshot = service.session().snapshot().await;
    json!({
        "user": snapshot.user,
        "historyCount": snapshot.history.len(),
        "artistTracksCount": snapshot.artist_tracks.len(),
    })
}

pub async fn toggle_audio(service: &CoreService) -> Result<()> {
    service.player().toggle().await?;
    Ok(())
}

/// Panic on purpose so the error boundary can be exercised by hand.
pub fn trigger_crash() -> ! {
    panic!("{CRASH_MESSAGE}")
}
