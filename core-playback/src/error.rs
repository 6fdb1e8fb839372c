//! # Playback Error Types

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback and offline cache operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// The transport refused the new source.
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    /// The transport could not start or resume playback.
    #[error("Playback operation failed: {0}")]
    PlaybackFailed(String),

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// Volume outside `0.0..=1.0` under the reject policy, or not a number.
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f32),

    #[error("Invalid seek position: {0}")]
    InvalidPosition(f64),

    #[error("Transport control failed: {0}")]
    TransportError(String),

    // ========================================================================
    // Cache Errors
    // ========================================================================
    /// Offline cache operation failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Download of track {track_id} failed: {reason}")]
    DownloadFailed { track_id: String, reason: String },

    /// Downloads are switched off by configuration.
    #[error("Offline downloads are disabled")]
    OfflineCacheDisabled,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        match self {
            PlaybackError::Bridge(e) => e.is_network(),
            PlaybackError::DownloadFailed { .. } => true,
            _ => false,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
