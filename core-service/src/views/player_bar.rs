use core_library::format_time;
use core_playback::PlaybackController;
use serde::Serialize;

/// What the download button next to the track title does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadAction {
    Download,
    Remove,
    /// A download is running; the button is disabled.
    Busy,
}

impl DownloadAction {
    pub fn label(&self) -> &'static str {
        match self {
            DownloadAction::Download => "Download for Offline",
            DownloadAction::Remove => "Remove Download",
            DownloadAction::Busy => "Downloading",
        }
    }
}

/// Persistent bar at the bottom of every page. Hidden until a track is chosen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBarView {
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    pub is_playing: bool,
    pub elapsed: String,
    pub total: String,
    /// Seek bar fill, `0.0..=1.0`.
    pub progress: f64,
    /// Upper bound for the seek input; 100 until the duration is known.
    pub seek_max: f64,
    pub volume: f32,
    pub is_offline: bool,
    pub is_downloading: bool,
    pub download_action: DownloadAction,
}

impl PlayerBarView {
    pub fn build(player: &PlaybackController) -> Option<Self> {
        let state = player.state();
        let track = state.current_track.as_ref()?;

        let is_offline = player.is_offline(&track.id);
        let is_downloading = player.is_downloading(&track.id);
        let download_action = if is_downloading {
            DownloadAction::Busy
        } else if is_offline {
            DownloadAction::Remove
        } else {
            DownloadAction::Download
        };

        Some(Self {
            track_id: track.id.to_string(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            cover_url: track.cover_url.clone(),
            is_playing: state.is_playing,
            elapsed: format_time(state.position),
            total: format_time(state.duration),
            progress: state.progress(),
            seek_max: if state.duration > 0.0 { state.duration } else { 100.0 },
            volume: state.volume,
            is_offline,
            is_downloading,
            download_action,
        })
    }
}
