//! Home page: greeting, featured playlists and the "Made For You" grid.

use chrono::{DateTime, Local, Timelike, Utc};
use core_library::{Playlist, Track};
use core_playback::PlaybackController;
use serde::Serialize;

use crate::service::CoreService;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover_url: String,
    /// Track started by the card's play button.
    pub lead_track_id: Option<String>,
}

impl From<&Playlist> for PlaylistCard {
    fn from(playlist: &Playlist) -> Self {
        Self {
            id: playlist.id.clone(),
            title: playlist.title.clone(),
            description: playlist.description.clone(),
            cover_url: playlist.cover_url.clone(),
            lead_track_id: playlist.tracks.first().map(|t| t.id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCard {
    pub track: Track,
    pub is_current: bool,
    /// Current and playing; the card shows the equalizer instead of a play icon.
    pub is_playing: bool,
    pub is_offline: bool,
}

impl TrackCard {
    pub fn build(track: &Track, player: &PlaybackController) -> Self {
        let state = player.state();
        let is_current = state.is_active(track);
        Self {
            track: track.clone(),
            is_current,
            is_playing: is_current && state.is_playing,
            is_offline: player.is_offline(&track.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub greeting: &'static str,
    pub playlists: Vec<PlaylistCard>,
    pub tracks: Vec<TrackCard>,
}

impl HomeView {
    pub fn build(service: &CoreService) -> Self {
        let catalog = service.catalog();
        let player = service.player();
        Self {
            greeting: greeting_at(service.config().clock.now()),
            playlists: catalog.playlists().iter().map(PlaylistCard::from).collect(),
            tracks: catalog
                .tracks()
                .iter()
                .map(|track| TrackCard::build(track, player))
                .collect(),
        }
    }
}

/// Greeting for the viewer's local time of day.
pub fn greeting_at(now: DateTime<Utc>) -> &'static str {
    greeting_for_hour(now.with_timezone(&Local).hour())
}

pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good Morning",
        12..=16 => "Good Afternoon",
        17..=20 => "Good Evening",
        _ => "Good Night",
    }
}
