use core_library::Track;
use serde::Serialize;

/// Snapshot of the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    /// Seconds from the start of the current source.
    pub position: f64,
    /// Seconds; zero until the transport reports it.
    pub duration: f64,
    pub volume: f32,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            position: 0.0,
            duration: 0.0,
            volume,
        }
    }

    /// Fraction of the track played, in `0.0..=1.0`. Zero while the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.position / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_active(&self, track: &Track) -> bool {
        self.current_track
            .as_ref()
            .is_some_and(|current| current.id == track.id)
    }
}

/// What a call to `play` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The track was loaded and playback began.
    Started,
    /// The track was already active; play/pause was flipped.
    Toggled,
    /// A later `play` call took over before this one finished.
    Superseded,
}
