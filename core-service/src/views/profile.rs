//! Profile page.
//!
//! Listeners see their listening history, artists see the release dashboard.
//! [`ProfileView::build`] picks the variant in a single match on the role.

use core_library::{format_time, Track, User, UserRole};
use core_playback::PlaybackController;
use core_session::SessionManager;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRow {
    /// One-based position in the list.
    pub number: usize,
    pub track: Track,
    pub is_current: bool,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerProfile {
    pub user: User,
    /// "n Songs Played"
    pub summary: String,
    pub account_label: String,
    pub history: Vec<TrackRow>,
    pub empty_notice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDashboard {
    pub user: User,
    /// "n Releases"
    pub summary: String,
    pub releases: Vec<TrackRow>,
    pub empty_notice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProfileView {
    Listener(ListenerProfile),
    Artist(ArtistDashboard),
}

impl ProfileView {
    /// `None` when nobody is signed in.
    pub async fn build(session: &SessionManager, player: &PlaybackController) -> Option<Self> {
        let snapshot = session.snapshot().await;
        let user = snapshot.user?;
        let current = player.current_track();

        let rows = |tracks: &[Track]| -> Vec<TrackRow> {
            tracks
                .iter()
                .enumerate()
                .map(|(i, track)| TrackRow {
                    number: i + 1,
                    track: track.clone(),
                    is_current: current.as_ref().is_some_and(|c| c.id == track.id),
                    duration: format_time(f64::from(track.duration)),
                })
                .collect()
        };

        let view = match user.role {
            UserRole::Listener => ProfileView::Listener(ListenerProfile {
                summary: format!("{} Songs Played", snapshot.history.len()),
                account_label: "User Account".to_string(),
                empty_notice: snapshot
                    .history
                    .is_empty()
                    .then_some("You haven't played any tracks yet."),
                history: rows(&snapshot.history),
                user,
            }),
            UserRole::Artist => ProfileView::Artist(ArtistDashboard {
                summary: format!("{} Releases", snapshot.artist_tracks.len()),
                empty_notice: snapshot
                    .artist_tracks
                    .is_empty()
                    .then_some("You haven't uploaded any music yet."),
                releases: rows(&snapshot.artist_tracks),
                user,
            }),
        };
        Some(view)
    }

    pub fn user(&self) -> &User {
        match self {
            ProfileView::Listener(profile) => &profile.user,
            ProfileView::Artist(dashboard) => &dashboard.user,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            ProfileView::Listener(profile) => &profile.summary,
            ProfileView::Artist(dashboard) => &dashboard.summary,
        }
    }

    pub fn is_verified_artist(&self) -> bool {
        matches!(self, ProfileView::Artist(_))
    }
}
