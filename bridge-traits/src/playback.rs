//! Audio transport bridge.
//!
//! The core drives exactly one audio output. Hosts wrap whatever plays sound
//! on their platform (an `HTMLAudioElement`, a native sink) in an
//! [`AudioTransport`] and report progress back through [`TransportSignal`]s.

use crate::{error::Result, platform::PlatformSendSync};
use bytes::Bytes;
use std::sync::Arc;

/// Where the transport should read audio from.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// Remote URL fetched and streamed by the host.
    Remote { url: String },
    /// Complete payload already held in memory (served from the offline cache).
    Payload {
        data: Bytes,
        mime_type: Option<String>,
    },
}

impl AudioSource {
    pub fn remote(url: impl Into<String>) -> Self {
        AudioSource::Remote { url: url.into() }
    }

    pub fn payload(data: Bytes) -> Self {
        AudioSource::Payload {
            data,
            mime_type: None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, AudioSource::Remote { .. })
    }

    /// Short label used in logs and events.
    pub fn origin(&self) -> &'static str {
        match self {
            AudioSource::Remote { .. } => "network",
            AudioSource::Payload { .. } => "offline",
        }
    }
}

/// Progress reported by the transport while a source is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportSignal {
    /// Current position in seconds.
    PositionChanged(f64),
    /// Total length of the loaded source in seconds.
    DurationKnown(f64),
    /// Playback reached the end of the source.
    Ended,
}

/// Callback invoked by the transport for every [`TransportSignal`].
#[cfg(not(target_arch = "wasm32"))]
pub type SignalHandler = Arc<dyn Fn(TransportSignal) + Send + Sync>;

/// Callback invoked by the transport for every [`TransportSignal`].
#[cfg(target_arch = "wasm32")]
pub type SignalHandler = Arc<dyn Fn(TransportSignal)>;

/// Single audio output handle owned by the playback controller.
///
/// `play` is asynchronous because hosts may refuse or delay playback (browser
/// autoplay policies, a source that fails to load). Every other control is a
/// synchronous instruction to the underlying engine.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioTransport: PlatformSendSync {
    /// Replace the loaded source. Releases any resources held for the previous one.
    fn set_source(&self, source: AudioSource) -> Result<()>;

    /// Start or resume playback of the current source.
    async fn play(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    /// Move the playhead to `seconds` from the start of the source.
    fn set_position(&self, seconds: f64) -> Result<()>;

    /// Set output volume in `0.0..=1.0`.
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Install the callback that receives transport signals. Replaces any previous handler.
    fn set_signal_handler(&self, handler: SignalHandler);
}
