//! `localStorage` implementation of the settings bridge.
//!
//! Keys are scoped as `{namespace}::settings::{key}` so several host shells can
//! share an origin without clobbering each other's data. `clear_all` and
//! `list_keys` only see keys inside the store's own namespace.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::SettingsStore,
};

use crate::error::js_error;

const SETTINGS_PREFIX: &str = "settings";

fn local_storage() -> BridgeResult<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".into()))?;
    window
        .local_storage()
        .map_err(|err| js_error("localStorage", err))?
        .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))
}

fn namespaced_prefix(namespace: &str) -> String {
    format!("{namespace}::{SETTINGS_PREFIX}::")
}

/// Browser-backed settings store (plain-text key/value pairs).
#[derive(Clone)]
pub struct WasmSettingsStore {
    storage: web_sys::Storage,
    prefix: String,
}

impl WasmSettingsStore {
    /// Construct a new settings store scoped to the provided namespace.
    pub fn new(namespace: impl AsRef<str>) -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            prefix: namespaced_prefix(namespace.as_ref()),
        })
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait(?Send)]
impl SettingsStore for WasmSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        // Quota errors surface here as a DOMException.
        self.storage
            .set_item(&self.key_for(key), value)
            .map_err(|err| js_error("set setting", err))
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(&self.key_for(key))
            .map_err(|err| js_error("get setting", err))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.key_for(key))
            .map_err(|err| js_error("remove setting", err))
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        let len = self
            .storage
            .length()
            .map_err(|err| js_error("storage length", err))?;
        let mut keys = Vec::new();
        for idx in 0..len {
            if let Some(entry) = self
                .storage
                .key(idx)
                .map_err(|err| js_error("storage key", err))?
            {
                if let Some(key) = entry.strip_prefix(&self.prefix) {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        for key in self.list_keys().await? {
            self.storage
                .remove_item(&self.key_for(&key))
                .map_err(|err| js_error("clear setting", err))?;
        }
        Ok(())
    }
}
