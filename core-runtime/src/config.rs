//! # Core Configuration
//!
//! Collects the host bridges and tunables the core needs and validates them
//! once, at startup.
//!
//! ## Required bridges
//!
//! | Bridge | Purpose |
//! |--------|---------|
//! | [`SettingsStore`] | Session, history and artist catalog persistence |
//! | [`ObjectStore`] | Offline audio payloads |
//! | [`HttpClient`] | Fetching payloads for offline use |
//! | [`AudioTransport`] | The single audio output |
//!
//! With the `desktop-shims` feature the builder falls back to the native
//! `ReqwestHttpClient` and `FileObjectStore` when those two are not injected.
//! The settings store and the audio transport always come from the host.
//!
//! ## Example
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, VolumePolicy};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .settings_store(Arc::new(settings))
//!     .object_store(Arc::new(objects))
//!     .http_client(Arc::new(http))
//!     .audio_transport(Arc::new(transport))
//!     .default_volume(0.6)
//!     .volume_policy(VolumePolicy::Reject)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{AudioTransport, Clock, HttpClient, ObjectStore, SettingsStore, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the player treats a volume request outside `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumePolicy {
    /// Snap the value into range.
    #[default]
    Clamp,
    /// Refuse the request and leave the volume unchanged.
    Reject,
}

/// Player tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume applied to the transport when the player is created.
    pub default_volume: f32,
    pub volume_policy: VolumePolicy,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.8,
            volume_policy: VolumePolicy::Clamp,
        }
    }
}

impl PlaybackSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.default_volume.is_finite() || !(0.0..=1.0).contains(&self.default_volume) {
            return Err(Error::Config(format!(
                "Default volume must be within 0.0..=1.0, got {}",
                self.default_volume
            )));
        }
        Ok(())
    }
}

/// Optional behaviour toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Allow downloading tracks into the offline cache. When off, playback
    /// still reads existing cache entries but `download` is refused.
    pub enable_offline_cache: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_offline_cache: true,
        }
    }
}

/// Validated core configuration.
#[derive(Clone)]
pub struct CoreConfig {
    pub settings_store: Arc<dyn SettingsStore>,
    pub object_store: Arc<dyn ObjectStore>,
    pub http_client: Arc<dyn HttpClient>,
    pub audio_transport: Arc<dyn AudioTransport>,
    pub clock: Arc<dyn Clock>,
    pub features: FeatureFlags,
    pub playback: PlaybackSettings,
    /// Capacity of the event bus channel.
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("settings_store", &"SettingsStore { ... }")
            .field("object_store", &"ObjectStore { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field("audio_transport", &"AudioTransport { ... }")
            .field("clock", &"Clock { ... }")
            .field("features", &self.features)
            .field("playback", &self.playback)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.playback.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > 10_000 {
            return Err(Error::Config(
                "Event buffer size exceeds maximum of 10,000".to_string(),
            ));
        }

        Ok(())
    }
}

fn capability_missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

fn settings_store_missing_error() -> Error {
    capability_missing(
        "SettingsStore",
        "SettingsStore implementation is required for session, history and artist catalog persistence. \
         Web: inject the localStorage-backed WasmSettingsStore. \
         Native: inject SqliteSettingsStore.",
    )
}

fn audio_transport_missing_error() -> Error {
    capability_missing(
        "AudioTransport",
        "AudioTransport implementation is required for playback. \
         Web: inject HtmlAudioTransport. \
         Native: inject a platform audio sink (NullAudioTransport for headless use).",
    )
}

#[cfg(feature = "desktop-shims")]
fn provide_default_object_store() -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = Arc::new(bridge_desktop::FileObjectStore::in_cache_dir());
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_object_store() -> Result<Arc<dyn ObjectStore>> {
    Err(capability_missing(
        "ObjectStore",
        "ObjectStore implementation is required for the offline cache. \
         Desktop: enable the 'desktop-shims' feature to use the default FileObjectStore. \
         Web: inject the IndexedDB-backed IdbObjectStore.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    let client = bridge_desktop::ReqwestHttpClient::new().map_err(|e| {
        Error::Internal(format!("Failed to initialize default HttpClient: {}", e))
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing(
        "HttpClient",
        "HttpClient implementation is required to download tracks for offline use. \
         Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
         Web: inject the fetch-backed WasmHttpClient.",
    ))
}

#[derive(Default)]
pub struct CoreConfigBuilder {
    settings_store: Option<Arc<dyn SettingsStore>>,
    object_store: Option<Arc<dyn ObjectStore>>,
    http_client: Option<Arc<dyn HttpClient>>,
    audio_transport: Option<Arc<dyn AudioTransport>>,
    clock: Option<Arc<dyn Clock>>,
    features: FeatureFlags,
    playback: PlaybackSettings,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn audio_transport(mut self, transport: Arc<dyn AudioTransport>) -> Self {
        self.audio_transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn enable_offline_cache(mut self, enabled: bool) -> Self {
        self.features.enable_offline_cache = enabled;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn playback(mut self, playback: PlaybackSettings) -> Self {
        self.playback = playback;
        self
    }

    pub fn default_volume(mut self, volume: f32) -> Self {
        self.playback.default_volume = volume;
        self
    }

    pub fn volume_policy(mut self, policy: VolumePolicy) -> Self {
        self.playback.volume_policy = policy;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn build(self) -> Result<CoreConfig> {
        let settings_store = self
            .settings_store
            .ok_or_else(settings_store_missing_error)?;

        let audio_transport = self
            .audio_transport
            .ok_or_else(audio_transport_missing_error)?;

        let object_store = match self.object_store {
            Some(store) => store,
            None => provide_default_object_store()?,
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = CoreConfig {
            settings_store,
            object_store,
            http_client,
            audio_transport,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            features: self.features,
            playback: self.playback,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
