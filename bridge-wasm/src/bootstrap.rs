//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells call [`build_wasm_bridges`] during startup and hand the result to
//! `core-service`. It plays the role `bridge-desktop` plays for native targets.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult,
    http::HttpClient,
    playback::AudioTransport,
    storage::{ObjectStore, SettingsStore},
};

use crate::{
    audio::HtmlAudioTransport, http::WasmHttpClient, object_store::IdbObjectStore,
    storage::WasmSettingsStore,
};

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// Prefix for `localStorage` keys.
    pub namespace: String,
    /// IndexedDB database holding offline payloads.
    pub database: String,
}

impl WasmBridgeConfig {
    /// Create a new config using the provided namespace and the default database.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            database: crate::object_store::DB_NAME.to_string(),
        }
    }

    /// Override the IndexedDB database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self::new("musicpod")
    }
}

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// Settings store layered on `localStorage`.
    pub settings_store: Arc<dyn SettingsStore>,
    /// IndexedDB store for offline payloads.
    pub object_store: Arc<dyn ObjectStore>,
    /// Audio element driven by the playback controller.
    pub audio_transport: Arc<dyn AudioTransport>,
}

/// Build the default wasm bridge stack.
///
/// Installs the panic hook so a Rust panic shows up in the devtools console
/// with its message instead of `unreachable executed`.
pub fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    console_error_panic_hook::set_once();

    Ok(WasmBridgeSet {
        http_client: Arc::new(WasmHttpClient::new()?),
        settings_store: Arc::new(WasmSettingsStore::new(&config.namespace)?),
        object_store: Arc::new(IdbObjectStore::with_database(config.database)),
        audio_transport: Arc::new(HtmlAudioTransport::new()?),
    })
}
