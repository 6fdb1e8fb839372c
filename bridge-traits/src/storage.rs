//! Storage Abstractions
//!
//! Two persistence capabilities back the core:
//!
//! - [`SettingsStore`] holds small string values (session, history, uploads).
//!   Browsers implement it over `localStorage`.
//! - [`ObjectStore`] holds whole binary payloads keyed by identifier. Browsers
//!   implement it over an IndexedDB object store.

use bytes::Bytes;

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Key-value settings storage trait
///
/// Values are opaque strings. Callers that persist structured data serialize
/// it to JSON themselves and decide how to treat unparseable content.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn remember_volume(store: &dyn SettingsStore, volume: f32) -> Result<()> {
///     store.set_string("musicpod_volume", &volume.to_string()).await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SettingsStore: PlatformSendSync {
    /// Store a string value, replacing any previous value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a setting. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings owned by this store
    async fn clear_all(&self) -> Result<()>;
}

/// Binary object storage trait
///
/// Each key holds exactly one payload. `put` overwrites, `get` returns `None`
/// for unknown keys and `delete` of an unknown key succeeds.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ObjectStore: PlatformSendSync {
    async fn put(&self, key: &str, value: Bytes) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn list_keys(&self) -> Result<Vec<String>>;

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
