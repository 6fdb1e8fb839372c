//! # Playback Controller
//!
//! Owns the single [`AudioTransport`] and the [`PlaybackState`] the views
//! render.
//!
//! ## Starting a track
//!
//! `play(track)` on a new track records it in the session history, makes it
//! the active track with position and duration cleared, then loads the cached
//! payload if one exists and the network URL otherwise. A failing cache read
//! aborts the call with the player paused.
//!
//! Each `play` takes a ticket from a monotonic counter. A call whose ticket is
//! no longer the newest when it reaches the transport neither loads its source
//! nor marks the player as playing, so rapid clicks settle on the last track
//! chosen.
//!
//! ## Transport signals
//!
//! The controller installs a signal handler on the transport when it is
//! built. The handler holds a weak reference, so dropping the controller
//! silences it. Position and duration signals are ignored between the reset
//! of a track switch and the moment the new source is loaded.

use crate::cache::{DownloadOutcome, OfflineCacheManager};
use crate::error::{PlaybackError, Result};
use crate::state::{PlayOutcome, PlaybackState};
use bridge_traits::{AudioSource, AudioTransport, TransportSignal};
use core_library::{Track, TrackId};
use core_runtime::config::{PlaybackSettings, VolumePolicy};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use core_session::SessionManager;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct PlaybackController {
    transport: Arc<dyn AudioTransport>,
    cache: Arc<OfflineCacheManager>,
    session: Arc<SessionManager>,
    event_bus: EventBus,
    volume_policy: VolumePolicy,
    state: RwLock<PlaybackState>,
    play_token: AtomicU64,
    /// Cleared when a track switch resets the state, set once its source is loaded.
    source_ready: AtomicBool,
    /// Held while checking the ticket and replacing the transport source.
    source_lock: Mutex<()>,
}

impl PlaybackController {
    /// Build the controller and attach it to `transport`.
    pub fn new(
        transport: Arc<dyn AudioTransport>,
        cache: Arc<OfflineCacheManager>,
        session: Arc<SessionManager>,
        event_bus: EventBus,
        settings: PlaybackSettings,
    ) -> Arc<Self> {
        let volume = if settings.default_volume.is_finite() {
            settings.default_volume.clamp(0.0, 1.0)
        } else {
            PlaybackSettings::default().default_volume
        };

        if let Err(e) = transport.set_volume(volume) {
            warn!(error = %e, "Failed to apply initial volume");
        }

        let controller = Arc::new(Self {
            transport,
            cache,
            session,
            event_bus,
            volume_policy: settings.volume_policy,
            state: RwLock::new(PlaybackState::new(volume)),
            play_token: AtomicU64::new(0),
            source_ready: AtomicBool::new(false),
            source_lock: Mutex::new(()),
        });

        let weak = Arc::downgrade(&controller);
        controller
            .transport
            .set_signal_handler(Arc::new(move |signal: TransportSignal| {
                if let Some(controller) = weak.upgrade() {
                    controller.handle_signal(signal);
                }
            }));

        controller
    }

    // ------------------------------------------------------------------
    // Transport control
    // ------------------------------------------------------------------

    /// Start `track`, or flip play/pause when it is already the active track.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn play(&self, track: &Track) -> Result<PlayOutcome> {
        let already_active = self.state.read().is_active(track);
        if already_active {
            self.toggle().await?;
            return Ok(PlayOutcome::Toggled);
        }

        let token = self.play_token.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write();
            if !self.is_latest(token) {
                return Ok(PlayOutcome::Superseded);
            }
            state.current_track = Some(track.clone());
            state.is_playing = false;
            state.position = 0.0;
            state.duration = 0.0;
            self.source_ready.store(false, Ordering::SeqCst);
        }

        if let Err(e) = self.session.add_to_history(track).await {
            warn!(error = %e, "Failed to record listening history");
        }

        let source = match self.cache.payload(&track.id).await {
            Ok(Some(payload)) => {
                debug!(bytes = payload.len(), "Using offline payload");
                AudioSource::payload(payload)
            }
            Ok(None) => AudioSource::remote(track.audio_url.clone()),
            Err(e) => {
                if !self.is_latest(token) {
                    return Ok(PlayOutcome::Superseded);
                }
                error!(error = %e, "Offline lookup failed");
                return Err(self.fail(&track.id, e));
            }
        };
        let origin = source.origin();

        {
            let _source = self.source_lock.lock();
            if !self.is_latest(token) {
                debug!("Superseded before loading");
                return Ok(PlayOutcome::Superseded);
            }
            if let Err(e) = self.transport.set_source(source) {
                error!(error = %e, "Transport rejected source");
                return Err(self.fail(&track.id, PlaybackError::SourceUnavailable(e.to_string())));
            }
            self.source_ready.store(true, Ordering::SeqCst);
        }

        self.emit(PlaybackEvent::TrackChanged {
            track_id: track.id.to_string(),
            title: track.title.clone(),
            source: origin.to_string(),
        });

        let started = self.transport.play().await;
        {
            let mut state = self.state.write();
            if !self.is_latest(token) {
                debug!("Superseded while starting");
                return Ok(PlayOutcome::Superseded);
            }
            match &started {
                Ok(()) => state.is_playing = true,
                Err(_) => state.is_playing = false,
            }
        }

        match started {
            Ok(()) => {
                info!(source = origin, "Playback started");
                self.emit(PlaybackEvent::Started {
                    track_id: track.id.to_string(),
                });
                Ok(PlayOutcome::Started)
            }
            Err(e) => {
                error!(error = %e, "Playback failed to start");
                Err(self.fail(&track.id, PlaybackError::PlaybackFailed(e.to_string())))
            }
        }
    }

    /// Flip between playing and paused. No-op without an active track.
    #[instrument(skip(self))]
    pub async fn toggle(&self) -> Result<()> {
        let (track_id, playing) = {
            let state = self.state.read();
            match &state.current_track {
                Some(track) => (track.id.clone(), state.is_playing),
                None => {
                    debug!("Nothing to toggle");
                    return Ok(());
                }
            }
        };

        if playing {
            self.transport
                .pause()
                .map_err(|e| PlaybackError::TransportError(e.to_string()))?;
            self.state.write().is_playing = false;
            self.emit(PlaybackEvent::Paused {
                track_id: track_id.to_string(),
            });
            return Ok(());
        }

        let token = self.play_token.load(Ordering::SeqCst);
        if let Err(e) = self.transport.play().await {
            error!(error = %e, "Resume failed");
            return Err(self.fail(&track_id, PlaybackError::PlaybackFailed(e.to_string())));
        }

        {
            let mut state = self.state.write();
            if !self.is_latest(token) {
                return Ok(());
            }
            state.is_playing = true;
        }
        self.emit(PlaybackEvent::Started {
            track_id: track_id.to_string(),
        });
        Ok(())
    }

    /// Move the playhead. Clamped to the known duration. No-op without an active track.
    pub fn seek(&self, position: f64) -> Result<()> {
        if !position.is_finite() {
            return Err(PlaybackError::InvalidPosition(position));
        }

        let (track_id, duration) = {
            let state = self.state.read();
            match &state.current_track {
                Some(track) => (track.id.clone(), state.duration),
                None => return Ok(()),
            }
        };

        let target = if duration > 0.0 {
            position.clamp(0.0, duration)
        } else {
            position.max(0.0)
        };

        self.transport
            .set_position(target)
            .map_err(|e| PlaybackError::TransportError(e.to_string()))?;
        self.state.write().position = target;

        self.emit(PlaybackEvent::PositionChanged {
            track_id: track_id.to_string(),
            position_ms: seconds_to_millis(target),
            duration_ms: seconds_to_millis(duration),
        });
        Ok(())
    }

    /// Set the output volume and return the level actually applied.
    pub fn set_volume(&self, level: f32) -> Result<f32> {
        if !level.is_finite() {
            return Err(PlaybackError::InvalidVolume(level));
        }

        let volume = match self.volume_policy {
            VolumePolicy::Clamp => level.clamp(0.0, 1.0),
            VolumePolicy::Reject if (0.0..=1.0).contains(&level) => level,
            VolumePolicy::Reject => return Err(PlaybackError::InvalidVolume(level)),
        };

        self.transport
            .set_volume(volume)
            .map_err(|e| PlaybackError::TransportError(e.to_string()))?;
        self.state.write().volume = volume;

        self.emit(PlaybackEvent::VolumeChanged {
            volume_percent: (volume * 100.0).round() as u8,
        });
        Ok(volume)
    }

    /// Apply a signal reported by the transport.
    pub fn handle_signal(&self, signal: TransportSignal) {
        match signal {
            TransportSignal::PositionChanged(position) => {
                if !self.source_ready() || !position.is_finite() || position < 0.0 {
                    return;
                }
                let (track_id, duration) = {
                    let mut state = self.state.write();
                    let track_id = match &state.current_track {
                        Some(track) => track.id.to_string(),
                        None => return,
                    };
                    state.position = position;
                    (track_id, state.duration)
                };
                self.emit(PlaybackEvent::PositionChanged {
                    track_id,
                    position_ms: seconds_to_millis(position),
                    duration_ms: seconds_to_millis(duration),
                });
            }
            TransportSignal::DurationKnown(duration) => {
                if !self.source_ready() || !duration.is_finite() || duration <= 0.0 {
                    return;
                }
                let mut state = self.state.write();
                if state.current_track.is_some() {
                    state.duration = duration;
                }
            }
            TransportSignal::Ended => {
                let track_id = {
                    let mut state = self.state.write();
                    state.is_playing = false;
                    state.current_track.as_ref().map(|t| t.id.to_string())
                };
                if let Some(track_id) = track_id {
                    info!(track_id = %track_id, "Track ended");
                    self.emit(PlaybackEvent::Ended { track_id });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Offline cache
    // ------------------------------------------------------------------

    pub async fn download(&self, track: &Track) -> Result<DownloadOutcome> {
        self.cache.download(track).await
    }

    pub async fn remove_offline(&self, track_id: &TrackId) -> Result<()> {
        self.cache.remove(track_id).await
    }

    pub fn is_offline(&self, track_id: &TrackId) -> bool {
        self.cache.is_offline(track_id)
    }

    pub fn is_downloading(&self, track_id: &TrackId) -> bool {
        self.cache.is_downloading(track_id)
    }

    pub fn cache(&self) -> &Arc<OfflineCacheManager> {
        &self.cache
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        self.state.read().clone()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state.read().current_track.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.read().is_playing
    }

    pub fn volume(&self) -> f32 {
        self.state.read().volume
    }

    fn source_ready(&self) -> bool {
        self.source_ready.load(Ordering::SeqCst)
    }

    fn is_latest(&self, token: u64) -> bool {
        self.play_token.load(Ordering::SeqCst) == token
    }

    fn fail(&self, track_id: &TrackId, err: PlaybackError) -> PlaybackError {
        self.state.write().is_playing = false;
        self.emit(PlaybackEvent::Error {
            track_id: Some(track_id.to_string()),
            message: err.to_string(),
        });
        err
    }

    fn emit(&self, event: PlaybackEvent) {
        self.event_bus.emit(CoreEvent::Playback(event)).ok();
    }
}

fn seconds_to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}
