//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, key-value
//! settings, object storage, audio output) into the MusicPod core and exposes
//! the page view models built on top of it. Desktop hosts typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`), whereas
//! WebAssembly builds enable the `wasm` feature and rely on the adapters from
//! `bridge-wasm`.

pub mod error;
pub mod service;
pub mod views;

pub use error::{CoreError, Result};
pub use service::{CoreService, OfflineToggle};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm::WasmBridgeConfig;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use bridge_wasm::{build_wasm_bridges, WasmBridgeSet};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use core_runtime::config::CoreConfig;

/// Convenience bootstrapper for desktop and headless hosts.
///
/// Settings live in SQLite under the platform data directory, offline payloads
/// under the cache directory, and audio goes to a transport that records
/// commands without producing sound.
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_desktop() -> Result<CoreService> {
    use std::sync::Arc;

    use bridge_desktop::{NullAudioTransport, SqliteSettingsStore};
    use core_runtime::config::CoreConfig;

    let settings = SqliteSettingsStore::in_default_location()
        .await
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let config = CoreConfig::builder()
        .settings_store(Arc::new(settings))
        .audio_transport(Arc::new(NullAudioTransport::new()))
        .build()?;
    CoreService::new(config).await
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn config_from_bridges(bridges: WasmBridgeSet) -> Result<CoreConfig> {
    Ok(CoreConfig::builder()
        .settings_store(bridges.settings_store)
        .object_store(bridges.object_store)
        .http_client(bridges.http_client)
        .audio_transport(bridges.audio_transport)
        .build()?)
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// ```
/// # #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_wasm, WasmBridgeConfig};
///
/// let config = WasmBridgeConfig::new("musicpod");
/// let core = bootstrap_wasm(config).await?;
/// let signed_in = core.session().is_signed_in().await;
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(config: WasmBridgeConfig) -> Result<CoreService> {
    let bridges = build_wasm_bridges(config)
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    CoreService::new(config_from_bridges(bridges)?).await
}
